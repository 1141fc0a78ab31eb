//! Output model handed to diagram writers.
//!
//! A [`PositionedModel`] is produced once per resolution and never changes
//! afterwards. All node, lane and pool bounds are absolute root-diagram
//! coordinates. Edge waypoints are absolute as well; each edge additionally
//! records the origin of the frame it belongs to so that writers which emit
//! container-relative coordinates can derive them with
//! [`PositionedEdge::frame_waypoints`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Point},
    identifier::Id,
    model::{EdgeKind, NodeKind},
};

/// A node with its final absolute geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: Id,
    pub kind: NodeKind,
    pub rank: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Id>,
    /// Set when the engine could only produce a best-effort position.
    pub needs_review: bool,
    pub bounds: Bounds,
}

/// An edge with its final route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedEdge {
    pub id: Id,
    pub kind: EdgeKind,
    pub source: Id,
    pub target: Id,
    /// True when the endpoints live in different lanes, pools or
    /// subprocesses; such edges must be written in root coordinates.
    pub crosses_boundary: bool,
    /// Absolute waypoints from the source boundary to the target boundary.
    pub waypoints: Vec<Point>,
    /// Absolute top-left of the container the edge belongs to. Always the
    /// root origin for edges that cross a boundary.
    pub frame_origin: Point,
}

impl PositionedEdge {
    /// Waypoints expressed in the edge's own frame.
    pub fn frame_waypoints(&self) -> Vec<Point> {
        self.waypoints
            .iter()
            .map(|point| point.sub_point(self.frame_origin))
            .collect()
    }
}

/// A lane with its computed band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedLane {
    pub id: Id,
    pub pool: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Offset of the lane's top edge from its pool's top edge.
    pub y_offset: f32,
    pub height: f32,
    pub bounds: Bounds,
}

/// A pool with its computed container box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedPool {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x_offset: f32,
    pub lanes: Vec<Id>,
    pub bounds: Bounds,
}

/// Non-fatal condition encountered while resolving positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// A node still overlaps a sibling after the bounded overlap passes.
    UnresolvedOverlap { node: Id },
    /// A boundary event's host does not exist.
    MissingBoundaryHost {
        node: Id,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        host: Option<Id>,
    },
    /// A node could not be placed by the regular pipeline and was put on
    /// the fallback grid.
    FallbackPlacement { node: Id, reason: String },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedOverlap { node } => write!(f, "node `{node}` still overlaps"),
            Self::MissingBoundaryHost {
                node,
                host: Some(host),
            } => {
                write!(f, "boundary event `{node}` references missing host `{host}`")
            }
            Self::MissingBoundaryHost { node, host: None } => {
                write!(f, "boundary event `{node}` has no host")
            }
            Self::FallbackPlacement { node, reason } => {
                write!(f, "node `{node}` placed on fallback grid: {reason}")
            }
        }
    }
}

/// Fully positioned diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionedModel {
    #[serde(rename = "pool")]
    pools: Vec<PositionedPool>,
    #[serde(rename = "lane")]
    lanes: Vec<PositionedLane>,
    #[serde(rename = "node")]
    nodes: Vec<PositionedNode>,
    #[serde(rename = "edge")]
    edges: Vec<PositionedEdge>,
    #[serde(default, rename = "warning", skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<LayoutWarning>,
}

impl PositionedModel {
    pub fn new(
        pools: Vec<PositionedPool>,
        lanes: Vec<PositionedLane>,
        nodes: Vec<PositionedNode>,
        edges: Vec<PositionedEdge>,
        warnings: Vec<LayoutWarning>,
    ) -> Self {
        Self {
            pools,
            lanes,
            nodes,
            edges,
            warnings,
        }
    }

    pub fn pools(&self) -> &[PositionedPool] {
        &self.pools
    }

    pub fn lanes(&self) -> &[PositionedLane] {
        &self.lanes
    }

    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PositionedEdge] {
        &self.edges
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    pub fn node(&self, id: Id) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: Id) -> Option<&PositionedEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn lane(&self, id: Id) -> Option<&PositionedLane> {
        self.lanes.iter().find(|lane| lane.id == id)
    }

    pub fn pool(&self, id: Id) -> Option<&PositionedPool> {
        self.pools.iter().find(|pool| pool.id == id)
    }

    /// Bounds enclosing every pool and node, or `None` for an empty model.
    pub fn diagram_bounds(&self) -> Option<Bounds> {
        self.pools
            .iter()
            .map(|pool| pool.bounds)
            .chain(self.nodes.iter().map(|node| node.bounds))
            .reduce(|acc, bounds| acc.merge(&bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn test_frame_waypoints_are_relative_to_origin() {
        let edge = PositionedEdge {
            id: Id::new("flow"),
            kind: EdgeKind::SequenceFlow,
            source: Id::new("a"),
            target: Id::new("b"),
            waypoints: vec![Point::new(130.0, 90.0), Point::new(180.0, 90.0)],
            crosses_boundary: false,
            frame_origin: Point::new(30.0, 50.0),
        };

        assert_eq!(
            edge.frame_waypoints(),
            vec![Point::new(100.0, 40.0), Point::new(150.0, 40.0)]
        );
    }

    #[test]
    fn test_diagram_bounds() {
        let pool_bounds = Bounds::new_from_top_left(Point::default(), Size::new(500.0, 300.0));
        let stray = Bounds::new_from_top_left(Point::new(0.0, 340.0), Size::new(100.0, 80.0));
        let model = PositionedModel::new(
            vec![PositionedPool {
                id: Id::new("p"),
                name: None,
                bounds: pool_bounds,
                x_offset: 0.0,
                lanes: vec![],
            }],
            vec![],
            vec![PositionedNode {
                id: Id::new("stray"),
                kind: NodeKind::Task,
                bounds: stray,
                rank: 0,
                lane: None,
                pool: None,
                parent: None,
                needs_review: true,
            }],
            vec![],
            vec![],
        );

        let bounds = model.diagram_bounds().unwrap();
        assert_eq!(bounds.height(), 420.0);
        assert!(PositionedModel::default().diagram_bounds().is_none());
    }

    #[test]
    fn test_warning_display() {
        let warning = LayoutWarning::MissingBoundaryHost {
            node: Id::new("timer"),
            host: Some(Id::new("ghost")),
        };
        assert_eq!(
            warning.to_string(),
            "boundary event `timer` references missing host `ghost`"
        );
    }
}
