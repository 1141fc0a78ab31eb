//! Input model handed over by the diagram parser.
//!
//! A [`ModelGraph`] is a plain description of a process diagram: flow nodes,
//! the connections between them, and the pool/lane hierarchy that owns them.
//! It carries no computed geometry beyond what the source diagram already
//! declared, and it is never mutated by the layout pipeline.
//!
//! Pre-existing node coordinates are top-left corners expressed in the node's
//! parent frame: root diagram space for top-level nodes, and the local space
//! of the enclosing subprocess for nodes with a `parent_subprocess`.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Point, Size},
    identifier::Id,
};

/// The kind of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Task,
    SubProcess,
    StartEvent,
    EndEvent,
    IntermediateEvent,
    BoundaryEvent,
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    EventBasedGateway,
    DataObject,
    TextAnnotation,
}

impl NodeKind {
    /// Default rendered size for nodes that do not declare one.
    pub fn default_size(self) -> Size {
        match self {
            Self::Task => Size::new(100.0, 80.0),
            Self::SubProcess => Size::new(350.0, 200.0),
            Self::StartEvent | Self::EndEvent | Self::IntermediateEvent | Self::BoundaryEvent => {
                Size::new(36.0, 36.0)
            }
            Self::ExclusiveGateway
            | Self::ParallelGateway
            | Self::InclusiveGateway
            | Self::EventBasedGateway => Size::new(50.0, 50.0),
            Self::DataObject => Size::new(36.0, 50.0),
            Self::TextAnnotation => Size::new(100.0, 30.0),
        }
    }

    pub fn is_event(self) -> bool {
        matches!(
            self,
            Self::StartEvent | Self::EndEvent | Self::IntermediateEvent | Self::BoundaryEvent
        )
    }

    pub fn is_gateway(self) -> bool {
        matches!(
            self,
            Self::ExclusiveGateway
                | Self::ParallelGateway
                | Self::InclusiveGateway
                | Self::EventBasedGateway
        )
    }

    /// Returns true for nodes that may contain other nodes.
    pub fn is_container(self) -> bool {
        matches!(self, Self::SubProcess)
    }
}

/// The kind of a connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    #[default]
    SequenceFlow,
    MessageFlow,
    Association,
}

/// A flow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: Id,
    #[serde(default)]
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lane: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pool: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_subprocess: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attached_host: Option<Id>,
}

impl Node {
    /// Creates a node of the given kind with no placement information.
    pub fn new(id: impl Into<Id>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            size: None,
            position: None,
            lane: None,
            pool: None,
            parent_subprocess: None,
            attached_host: None,
        }
    }

    /// Creates a boundary event attached to `host`.
    pub fn boundary(id: impl Into<Id>, host: impl Into<Id>) -> Self {
        Self::new(id, NodeKind::BoundaryEvent).with_attached_host(host)
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_lane(mut self, lane: impl Into<Id>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    pub fn with_pool(mut self, pool: impl Into<Id>) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn with_parent_subprocess(mut self, parent: impl Into<Id>) -> Self {
        self.parent_subprocess = Some(parent.into());
        self
    }

    pub fn with_attached_host(mut self, host: impl Into<Id>) -> Self {
        self.attached_host = Some(host.into());
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Declared size, or the default size of the node's kind.
    pub fn size(&self) -> Size {
        self.size.unwrap_or_else(|| self.kind.default_size())
    }

    /// Pre-existing top-left position in the parent frame, if any.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn lane(&self) -> Option<Id> {
        self.lane
    }

    pub fn pool(&self) -> Option<Id> {
        self.pool
    }

    pub fn parent_subprocess(&self) -> Option<Id> {
        self.parent_subprocess
    }

    pub fn attached_host(&self) -> Option<Id> {
        self.attached_host
    }

    /// Returns true if the node sits on another node's perimeter.
    pub fn is_boundary(&self) -> bool {
        self.kind == NodeKind::BoundaryEvent || self.attached_host.is_some()
    }
}

/// A connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    id: Id,
    source: Id,
    target: Id,
    #[serde(default)]
    kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    waypoints: Vec<Point>,
}

impl Edge {
    pub fn new(id: impl Into<Id>, source: impl Into<Id>, target: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::SequenceFlow,
            waypoints: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Point>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// Pre-existing absolute waypoints, empty if the source had none.
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }
}

/// A band inside a pool, typically a role or department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    id: Id,
    pool: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<Id>,
}

impl Lane {
    pub fn new(id: impl Into<Id>, pool: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            pool: pool.into(),
            name: None,
            nodes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Id>) -> Self {
        self.nodes = nodes.into_iter().collect();
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn pool(&self) -> Id {
        self.pool
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared member nodes, in display order.
    pub fn nodes(&self) -> &[Id] {
        &self.nodes
    }
}

/// A participant: the top-level container grouping lanes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lanes: Vec<Id>,
}

impl Pool {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            name: None,
            lanes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_lanes(mut self, lanes: impl IntoIterator<Item = Id>) -> Self {
        self.lanes = lanes.into_iter().collect();
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared lane order, top to bottom.
    pub fn lanes(&self) -> &[Id] {
        &self.lanes
    }
}

/// Complete parsed process diagram.
///
/// ```
/// use swimlane_core::model::{Edge, Lane, ModelGraph, Node, NodeKind, Pool};
///
/// let graph = ModelGraph::new()
///     .with_pool(Pool::new("shop").with_lanes(["sales".into()]))
///     .with_lane(Lane::new("sales", "shop"))
///     .with_node(Node::new("start", NodeKind::StartEvent).with_lane("sales"))
///     .with_node(Node::new("ship", NodeKind::Task).with_lane("sales"))
///     .with_edge(Edge::new("f1", "start", "ship"));
///
/// assert_eq!(graph.nodes().len(), 2);
/// assert!(graph.node("ship".into()).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelGraph {
    #[serde(default, rename = "pool")]
    pools: Vec<Pool>,
    #[serde(default, rename = "lane")]
    lanes: Vec<Lane>,
    #[serde(default, rename = "node")]
    nodes: Vec<Node>,
    #[serde(default, rename = "edge")]
    edges: Vec<Edge>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(mut self, pool: Pool) -> Self {
        self.pools.push(pool);
        self
    }

    pub fn with_lane(mut self, lane: Lane) -> Self {
        self.lanes.push(lane);
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Linear lookup of a node by id.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
