//! Boundary events and frame translation.
//!
//! Boundary events are placed once, relative to their host's top-left
//! corner, centered on the host's bottom edge and evenly spread when a host
//! carries several of them. When the even slots are too narrow the events
//! are packed side by side around the edge's midpoint instead, overhanging
//! the host's corners if needed. Because they are stored host-relative, they
//! follow the host through every later displacement.
//!
//! [`BoundaryPositioner::to_absolute`] is the single place where frame-local
//! coordinates become diagram coordinates: each node's local bounds are
//! offset by the absolute top-left of its frame owner, recursively for
//! nested subprocesses.

use log::trace;

use swimlane_core::geometry::{Bounds, Point, Size};

use crate::structure::{FlowGraph, Frame, NodeIndex};

/// Horizontal gap kept between neighbouring events on one host.
const EVENT_GAP: f32 = 8.0;

#[derive(Debug, Default)]
pub struct BoundaryPositioner;

impl BoundaryPositioner {
    pub fn new() -> Self {
        Self
    }

    /// Host-relative bounds of `events` attached to a host of size `host`.
    ///
    /// ```
    /// # use swimlane::layout::BoundaryPositioner;
    /// # use swimlane_core::geometry::{Point, Size};
    /// let placed = BoundaryPositioner::new()
    ///     .place_on_host(Size::new(80.0, 60.0), &[Size::new(36.0, 36.0)]);
    ///
    /// assert_eq!(placed[0].center(), Point::new(40.0, 60.0));
    /// ```
    pub fn place_on_host(&self, host: Size, events: &[Size]) -> Vec<Bounds> {
        let pitch = host.width() / (events.len() as f32 + 1.0);
        let spread_fits = events
            .windows(2)
            .all(|pair| pitch >= (pair[0].width() + pair[1].width()) / 2.0 + EVENT_GAP);

        let centers: Vec<f32> = if spread_fits {
            (1..=events.len()).map(|slot| pitch * slot as f32).collect()
        } else {
            let total = events.iter().map(|size| size.width()).sum::<f32>()
                + EVENT_GAP * events.len().saturating_sub(1) as f32;
            let mut left = (host.width() - total) / 2.0;
            events
                .iter()
                .map(|size| {
                    let center = left + size.width() / 2.0;
                    left += size.width() + EVENT_GAP;
                    center
                })
                .collect()
        };
        trace!(events = events.len(), packed = !spread_fits; "Boundary events placed on host");

        events
            .iter()
            .zip(centers)
            .map(|(&size, x)| Bounds::new_from_center(Point::new(x, host.height()), size))
            .collect()
    }

    /// Translates frame-local bounds into absolute diagram coordinates.
    ///
    /// `local` is indexed by [`NodeIndex::index`]. A node without local
    /// bounds, or whose frame owner has none, stays `None`.
    pub(crate) fn to_absolute(&self, graph: &FlowGraph, local: &[Option<Bounds>]) -> Vec<Option<Bounds>> {
        let mut memo: Vec<Option<Option<Bounds>>> = vec![None; local.len()];
        for idx in graph.node_indices() {
            absolute(graph, local, &mut memo, idx);
        }
        memo.into_iter().map(Option::flatten).collect()
    }
}

fn absolute(
    graph: &FlowGraph,
    local: &[Option<Bounds>],
    memo: &mut [Option<Option<Bounds>>],
    idx: NodeIndex,
) -> Option<Bounds> {
    if let Some(done) = memo[idx.index()] {
        return done;
    }

    let own = local[idx.index()];
    let result = match graph.node(idx).frame() {
        Frame::Root => own,
        Frame::Subprocess(owner) | Frame::Host(owner) => {
            let origin = absolute(graph, local, memo, owner).map(Bounds::min_point);
            own.zip(origin).map(|(bounds, origin)| bounds.translate(origin))
        }
    };

    trace!(node:% = graph.node(idx), bounds:? = result; "Translated to absolute");
    memo[idx.index()] = Some(result);
    result
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use swimlane_core::model::{ModelGraph, Node, NodeKind};

    use super::*;

    #[test]
    fn test_single_event_centered_on_bottom_edge() {
        let placed =
            BoundaryPositioner::new().place_on_host(Size::new(80.0, 60.0), &[Size::new(36.0, 36.0)]);

        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].center(), Point::new(40.0, 60.0));
        assert_approx_eq!(f32, placed[0].width(), 36.0);
    }

    #[test]
    fn test_events_evenly_distributed() {
        let events = [Size::new(36.0, 36.0); 3];
        let placed = BoundaryPositioner::new().place_on_host(Size::new(200.0, 100.0), &events);

        let xs: Vec<f32> = placed.iter().map(|bounds| bounds.center().x()).collect();
        assert_eq!(xs, vec![50.0, 100.0, 150.0]);
        assert!(placed.iter().all(|bounds| bounds.center().y() == 100.0));
    }

    fn assert_disjoint(placed: &[Bounds]) {
        for (pos, a) in placed.iter().enumerate() {
            for b in &placed[pos + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_crowded_task_events_are_packed() {
        let task = Size::new(100.0, 80.0);
        let positioner = BoundaryPositioner::new();

        let two = positioner.place_on_host(task, &[Size::new(36.0, 36.0); 2]);
        let xs: Vec<f32> = two.iter().map(|bounds| bounds.center().x()).collect();
        assert_eq!(xs, vec![28.0, 72.0]);
        assert_disjoint(&two);

        let three = positioner.place_on_host(task, &[Size::new(36.0, 36.0); 3]);
        assert_disjoint(&three);
        assert_approx_eq!(f32, three[1].center().x(), 50.0);
        assert!(three.iter().all(|bounds| bounds.center().y() == 80.0));
    }

    #[test]
    fn test_events_on_gateway_overhang_its_corners() {
        let gateway = Size::new(50.0, 50.0);
        let positioner = BoundaryPositioner::new();

        for count in 2..=3 {
            let placed = positioner.place_on_host(gateway, &vec![Size::new(36.0, 36.0); count]);
            assert_disjoint(&placed);
            let first = placed[0].center().x();
            let last = placed[count - 1].center().x();
            assert_approx_eq!(f32, (first + last) / 2.0, 25.0, epsilon = 0.001);
        }
    }

    #[test]
    fn test_to_absolute_nests_recursively() {
        let model = ModelGraph::new()
            .with_node(Node::new("outer", NodeKind::SubProcess))
            .with_node(Node::new("inner", NodeKind::SubProcess).with_parent_subprocess("outer"))
            .with_node(Node::new("leaf", NodeKind::Task).with_parent_subprocess("inner"))
            .with_node(Node::boundary("timer", "inner"));
        let graph = FlowGraph::from_model(&model).unwrap();
        let idx = |name: &str| graph.node_index(name.into()).unwrap().index();

        let mut local = vec![None; 4];
        local[idx("outer")] = Some(Bounds::new_from_top_left(
            Point::new(200.0, 200.0),
            Size::new(400.0, 300.0),
        ));
        local[idx("inner")] = Some(Bounds::new_from_top_left(
            Point::new(10.0, 10.0),
            Size::new(200.0, 150.0),
        ));
        local[idx("leaf")] = Some(Bounds::new_from_top_left(
            Point::new(10.0, 10.0),
            Size::new(100.0, 80.0),
        ));
        local[idx("timer")] = Some(Bounds::new_from_center(
            Point::new(100.0, 150.0),
            Size::new(36.0, 36.0),
        ));

        let absolute = BoundaryPositioner::new().to_absolute(&graph, &local);

        assert_eq!(absolute[idx("inner")].unwrap().min_point(), Point::new(210.0, 210.0));
        assert_eq!(absolute[idx("leaf")].unwrap().min_point(), Point::new(220.0, 220.0));
        assert_eq!(absolute[idx("timer")].unwrap().center(), Point::new(310.0, 360.0));
    }

    #[test]
    fn test_missing_owner_leaves_child_unplaced() {
        let model = ModelGraph::new()
            .with_node(Node::new("sub", NodeKind::SubProcess))
            .with_node(Node::new("leaf", NodeKind::Task).with_parent_subprocess("sub"));
        let graph = FlowGraph::from_model(&model).unwrap();

        let local = vec![
            None,
            Some(Bounds::new_from_top_left(Point::default(), Size::new(1.0, 1.0))),
        ];
        let absolute = BoundaryPositioner::new().to_absolute(&graph, &local);

        assert!(absolute.iter().all(Option::is_none));
    }
}
