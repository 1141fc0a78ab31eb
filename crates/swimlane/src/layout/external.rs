//! Pluggable external layout collaborators.
//!
//! A [`LayoutAdapter`] may propose node coordinates for one frame before the
//! internal pipeline runs. Adapters only ever see plain geometry: node sizes
//! and connections. Lane and pool semantics are applied afterwards no matter
//! what the adapter answered, and only the horizontal coordinate of a
//! proposal is kept.
//!
//! Adapters are unreliable by contract. Returning `None` declines the
//! request; the resolver additionally treats a panic as a decline.

use std::{
    collections::HashMap,
    panic,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use indexmap::IndexMap;
use log::{debug, trace, warn};
use rust_sugiyama::configure::Config;

use swimlane_core::{
    geometry::{Point, Size},
    identifier::Id,
};

/// Geometry handed to a [`LayoutAdapter`].
#[derive(Debug, Clone, Default)]
pub struct LayoutRequest {
    nodes: Vec<(Id, Size)>,
    edges: Vec<(Id, Id)>,
}

impl LayoutRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, id: Id, size: Size) -> Self {
        self.nodes.push((id, size));
        self
    }

    pub fn with_edge(mut self, source: Id, target: Id) -> Self {
        self.edges.push((source, target));
        self
    }

    pub fn nodes(&self) -> &[(Id, Size)] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(Id, Id)] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Strategy that may supply initial coordinates for a frame.
pub trait LayoutAdapter {
    /// Proposes node centers of a left-to-right drawing of `request`.
    ///
    /// Returns `None` when the adapter cannot help for any reason. Nodes
    /// missing from the returned map keep their internally computed column.
    fn try_layout(&self, request: &LayoutRequest) -> Option<IndexMap<Id, Point>>;

    /// Name used in warnings and log output.
    fn name(&self) -> &str {
        "external"
    }
}

/// Layer spacing unit requested from rust-sugiyama.
const VERTEX_SPACING: f64 = 1.0;

/// Layered layout through the `rust-sugiyama` crate.
///
/// The algorithm runs on a worker thread and is abandoned once the timeout
/// elapses. Layers of the Sugiyama drawing become columns; the position
/// within a layer becomes the vertical order.
pub struct SugiyamaAdapter {
    timeout: Duration,
    margin: f32,
}

impl SugiyamaAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            margin: 50.0,
        }
    }

    /// Gap added to the widest node to form the column pitch.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }
}

impl LayoutAdapter for SugiyamaAdapter {
    fn try_layout(&self, request: &LayoutRequest) -> Option<IndexMap<Id, Point>> {
        let node_ids: HashMap<Id, u32> = request
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(pos, (id, _))| u32::try_from(pos).ok().map(|pos| (*id, pos)))
            .collect();

        let edges: Vec<(u32, u32)> = request
            .edges()
            .iter()
            .filter_map(|(source, target)| Some((*node_ids.get(source)?, *node_ids.get(target)?)))
            .filter(|(source, target)| source != target)
            .collect();

        if edges.is_empty() {
            debug!(nodes = request.nodes().len(); "Sugiyama layout skipped: no edges");
            return None;
        }

        debug!(
            nodes = node_ids.len(),
            edges = edges.len();
            "Applying Sugiyama algorithm"
        );

        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("sugiyama-layout".to_string())
            .spawn(move || {
                let layouts = panic::catch_unwind(move || {
                    let config = Config {
                        minimum_length: 1,
                        vertex_spacing: VERTEX_SPACING,
                        ..Default::default()
                    };
                    rust_sugiyama::from_edges(&edges, &config)
                });
                if sender.send(layouts.ok()).is_err() {
                    trace!("Sugiyama result arrived after the caller gave up");
                }
            });

        if let Err(err) = worker {
            warn!(err:% = err; "Failed to spawn Sugiyama worker");
            return None;
        }

        let layouts = match receiver.recv_timeout(self.timeout) {
            Ok(Some(layouts)) => layouts,
            Ok(None) => {
                warn!("Sugiyama layout panicked");
                return None;
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_ms = self.timeout.as_millis(); "Sugiyama layout timed out");
                return None;
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Sugiyama worker exited without a result");
                return None;
            }
        };

        let sizes: HashMap<u32, Size> = request
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(pos, (_, size))| u32::try_from(pos).ok().map(|pos| (pos, *size)))
            .collect();
        let id_of: HashMap<u32, Id> = node_ids.iter().map(|(&id, &pos)| (pos, id)).collect();

        let max_width = sizes.values().map(|size| size.width()).fold(0.0, f32::max);
        let max_height = sizes.values().map(|size| size.height()).fold(0.0, f32::max);
        let column_pitch = max_width + self.margin;
        let row_pitch = max_height + self.margin;

        let mut centers = IndexMap::new();
        for (coords, _, _) in layouts {
            for (vertex, (x, y)) in coords {
                let Some(id) = u32::try_from(vertex).ok().and_then(|vertex| id_of.get(&vertex))
                else {
                    debug!(vertex = vertex; "Sugiyama vertex out of range");
                    continue;
                };
                // Layers grow along the Sugiyama y axis, possibly downward.
                let layer = (y.abs() / VERTEX_SPACING) as f32;
                let order = (x / VERTEX_SPACING) as f32;
                centers.insert(*id, Point::new(layer * column_pitch, order * row_pitch));
            }
        }

        if centers.is_empty() {
            debug!("Sugiyama layout returned no positions");
            return None;
        }

        // Requested order, so results do not depend on hash iteration.
        let ordered = request
            .nodes()
            .iter()
            .filter_map(|(id, _)| centers.get(id).map(|center| (*id, *center)))
            .collect();

        Some(ordered)
    }

    fn name(&self) -> &str {
        "sugiyama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> (Id, Size) {
        (Id::new(id), Size::new(100.0, 80.0))
    }

    #[test]
    fn test_sugiyama_declines_without_edges() {
        let (id, size) = task("alone");
        let request = LayoutRequest::new().with_node(id, size);

        let adapter = SugiyamaAdapter::new(Duration::from_secs(5));
        assert!(adapter.try_layout(&request).is_none());
    }

    #[test]
    fn test_sugiyama_layers_become_columns() {
        let request = ["a", "b", "c"]
            .into_iter()
            .map(task)
            .fold(LayoutRequest::new(), |request, (id, size)| {
                request.with_node(id, size)
            })
            .with_edge(Id::new("a"), Id::new("b"))
            .with_edge(Id::new("b"), Id::new("c"));

        let adapter = SugiyamaAdapter::new(Duration::from_secs(5));
        let centers = adapter.try_layout(&request).unwrap();

        let x = |name: &str| centers[&Id::new(name)].x();
        assert!(x("a") < x("b"));
        assert!(x("b") < x("c"));
    }

    #[test]
    fn test_request_builder() {
        let request = LayoutRequest::new()
            .with_node(Id::new("a"), Size::new(10.0, 10.0))
            .with_edge(Id::new("a"), Id::new("a"));

        assert!(!request.is_empty());
        assert_eq!(request.nodes().len(), 1);
        assert_eq!(request.edges().len(), 1);
    }
}
