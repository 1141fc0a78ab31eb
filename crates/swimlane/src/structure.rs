//! Validated arena view of a [`ModelGraph`].
//!
//! [`FlowGraph`] resolves every reference of the input model once, up front,
//! and stores nodes, lanes and pools in vectors addressed by typed integer
//! indices. The layout pipeline works exclusively against this arena.
//!
//! # Frames
//!
//! Every node lives in exactly one coordinate [`Frame`]:
//!
//! ```text
//! Root                 pools, lanes and top-level nodes (diagram space)
//! └── Subprocess(s)    interior of subprocess `s`, origin at its top-left
//!     └── Host(h)      boundary events, origin at their host's top-left
//! ```
//!
//! Malformed input (dangling edge endpoints, lanes of unknown pools,
//! duplicate ids, cyclic nesting) is rejected with
//! [`SwimlaneError::MalformedGraph`]. Recoverable problems detach the node
//! from the regular pipeline instead; see [`Detachment`].

use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{algo::toposort, graph::DiGraph};

use swimlane_core::{
    geometry::{Point, Size},
    identifier::Id,
    model::{EdgeKind, ModelGraph, NodeKind},
};

use crate::error::SwimlaneError;

/// Index of a node in the [`FlowGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a lane in the [`FlowGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneIndex(usize);

impl LaneIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a pool in the [`FlowGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolIndex(usize);

impl PoolIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Coordinate frame a node's working position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    Root,
    Subprocess(NodeIndex),
    Host(NodeIndex),
}

/// The container that scopes an edge's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Lane(LaneIndex),
    Subprocess(NodeIndex),
    Detached,
}

/// Why a node was taken out of the regular pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Detachment {
    /// `parent_subprocess` names a node that does not exist.
    MissingParent(Id),
    /// `lane` names a lane that does not exist.
    UnknownLane(Id),
    /// `pool` names a pool that does not exist.
    UnknownPool(Id),
}

impl fmt::Display for Detachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParent(id) => write!(f, "parent subprocess `{id}` does not exist"),
            Self::UnknownLane(id) => write!(f, "lane `{id}` does not exist"),
            Self::UnknownPool(id) => write!(f, "pool `{id}` does not exist"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowNode {
    id: Id,
    kind: NodeKind,
    size: Size,
    position: Option<Point>,
    frame: Frame,
    lane: Option<LaneIndex>,
    pool: Option<PoolIndex>,
    detached: Option<Detachment>,
    missing_host: Option<Option<Id>>,
}

impl FlowNode {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Pre-existing top-left position in the node's parent frame.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn lane(&self) -> Option<LaneIndex> {
        self.lane
    }

    pub fn pool(&self) -> Option<PoolIndex> {
        self.pool
    }

    pub fn detachment(&self) -> Option<&Detachment> {
        self.detached.as_ref()
    }

    /// For boundary events whose host could not be resolved: the declared
    /// host id, if there was one.
    pub fn missing_host(&self) -> Option<Option<Id>> {
        self.missing_host
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self.frame, Frame::Host(_))
    }
}

impl fmt::Display for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct FlowEdge {
    id: Id,
    kind: EdgeKind,
    source: NodeIndex,
    target: NodeIndex,
    waypoints: Vec<Point>,
}

impl FlowEdge {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn target(&self) -> NodeIndex {
        self.target
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }
}

#[derive(Debug, Clone)]
pub struct FlowLane {
    id: Id,
    name: Option<String>,
    pool: PoolIndex,
    nodes: Vec<NodeIndex>,
}

impl FlowLane {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pool(&self) -> PoolIndex {
        self.pool
    }

    /// Top-level member nodes in display order.
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }
}

#[derive(Debug, Clone)]
pub struct FlowPool {
    id: Id,
    name: Option<String>,
    lanes: Vec<LaneIndex>,
}

impl FlowPool {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Lanes from top to bottom.
    pub fn lanes(&self) -> &[LaneIndex] {
        &self.lanes
    }
}

/// Validated, index-addressed process graph.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    lanes: Vec<FlowLane>,
    pools: Vec<FlowPool>,
    node_indices: IndexMap<Id, NodeIndex>,
    containers: Vec<NodeIndex>,
}

impl FlowGraph {
    /// Validates `model` and builds the arena.
    ///
    /// # Errors
    ///
    /// Returns [`SwimlaneError::MalformedGraph`] carrying the offending id
    /// when an edge or lane references a missing element, when ids are
    /// duplicated, or when subprocess nesting forms a cycle.
    pub fn from_model(model: &ModelGraph) -> Result<Self, SwimlaneError> {
        check_unique("pool", model.pools().iter().map(|pool| pool.id()))?;
        check_unique("lane", model.lanes().iter().map(|lane| lane.id()))?;
        check_unique("node", model.nodes().iter().map(|node| node.id()))?;
        check_unique("edge", model.edges().iter().map(|edge| edge.id()))?;

        let mut builder = Builder::default();
        builder.add_pools_and_lanes(model)?;
        builder.add_nodes(model)?;
        builder.add_edges(model)?;
        let order = builder.nesting_order()?;
        builder.assign_lanes(model, &order)?;

        let containers = order
            .iter()
            .rev()
            .copied()
            .filter(|&idx| {
                builder
                    .nodes
                    .iter()
                    .any(|node| node.frame == Frame::Subprocess(idx))
            })
            .collect();

        let graph = Self {
            nodes: builder.nodes,
            edges: builder.edges,
            lanes: builder.lanes,
            pools: builder.pools,
            node_indices: builder.node_indices,
            containers,
        };

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            lanes = graph.lanes.len(),
            pools = graph.pools.len();
            "Flow graph built"
        );

        Ok(graph)
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn node(&self, idx: NodeIndex) -> &FlowNode {
        &self.nodes[idx.0]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).map(NodeIndex)
    }

    pub fn node_index(&self, id: Id) -> Option<NodeIndex> {
        self.node_indices.get(&id).copied()
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn lanes(&self) -> &[FlowLane] {
        &self.lanes
    }

    pub fn lane(&self, idx: LaneIndex) -> &FlowLane {
        &self.lanes[idx.0]
    }

    pub fn pools(&self) -> &[FlowPool] {
        &self.pools
    }

    pub fn pool(&self, idx: PoolIndex) -> &FlowPool {
        &self.pools[idx.0]
    }

    pub fn pool_indices(&self) -> impl Iterator<Item = PoolIndex> + '_ {
        (0..self.pools.len()).map(PoolIndex)
    }

    /// Nodes that own at least one interior node, innermost first.
    pub fn containers(&self) -> &[NodeIndex] {
        &self.containers
    }

    /// Nodes laid out by the regular pipeline inside `frame`.
    pub fn frame_nodes(&self, frame: Frame) -> impl Iterator<Item = NodeIndex> + '_ {
        self.node_indices().filter(move |&idx| {
            let node = self.node(idx);
            node.frame == frame && node.detached.is_none()
        })
    }

    /// Boundary events attached to `host`, in declaration order.
    pub fn boundary_events(&self, host: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.frame_nodes(Frame::Host(host))
    }

    /// The node whose position stands in for `idx` when ranking: boundary
    /// events are ranked as their host.
    pub fn rank_anchor(&self, idx: NodeIndex) -> NodeIndex {
        match self.node(idx).frame {
            Frame::Host(host) => self.rank_anchor(host),
            _ => idx,
        }
    }

    /// The lane or subprocess scoping `idx`'s coordinates.
    pub fn scope(&self, idx: NodeIndex) -> Scope {
        let node = self.node(idx);
        if node.detached.is_some() {
            return Scope::Detached;
        }
        match node.frame {
            Frame::Host(host) => self.scope(host),
            Frame::Subprocess(parent) => Scope::Subprocess(parent),
            Frame::Root => node.lane.map_or(Scope::Detached, Scope::Lane),
        }
    }
}

fn check_unique(element: &str, ids: impl Iterator<Item = Id>) -> Result<(), SwimlaneError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SwimlaneError::malformed(
                id,
                format!("duplicate {element} id"),
            ));
        }
    }
    Ok(())
}

#[derive(Default)]
struct Builder {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    lanes: Vec<FlowLane>,
    pools: Vec<FlowPool>,
    node_indices: IndexMap<Id, NodeIndex>,
    lane_indices: IndexMap<Id, LaneIndex>,
    pool_indices: IndexMap<Id, PoolIndex>,
    default_pool: Option<PoolIndex>,
}

impl Builder {
    fn add_pools_and_lanes(&mut self, model: &ModelGraph) -> Result<(), SwimlaneError> {
        for pool in model.pools() {
            self.pool_indices
                .insert(pool.id(), PoolIndex(self.pools.len()));
            self.pools.push(FlowPool {
                id: pool.id(),
                name: pool.name().map(str::to_string),
                lanes: Vec::new(),
            });
        }

        for lane in model.lanes() {
            let pool = *self.pool_indices.get(&lane.pool()).ok_or_else(|| {
                SwimlaneError::malformed(
                    lane.id(),
                    format!("lane references missing pool `{}`", lane.pool()),
                )
            })?;
            self.lane_indices
                .insert(lane.id(), LaneIndex(self.lanes.len()));
            self.lanes.push(FlowLane {
                id: lane.id(),
                name: lane.name().map(str::to_string),
                pool,
                nodes: Vec::new(),
            });
        }

        // Declared lane order first, then unlisted lanes in declaration order.
        for (pool_pos, pool) in model.pools().iter().enumerate() {
            let pool_idx = PoolIndex(pool_pos);
            let mut order = Vec::new();
            for lane_id in pool.lanes() {
                let lane_idx = *self.lane_indices.get(lane_id).ok_or_else(|| {
                    SwimlaneError::malformed(
                        pool.id(),
                        format!("pool references missing lane `{lane_id}`"),
                    )
                })?;
                if self.lanes[lane_idx.0].pool != pool_idx {
                    return Err(SwimlaneError::malformed(
                        *lane_id,
                        format!("lane is listed by pool `{}` but belongs to another pool", pool.id()),
                    ));
                }
                if !order.contains(&lane_idx) {
                    order.push(lane_idx);
                }
            }
            for (lane_pos, lane) in self.lanes.iter().enumerate() {
                let lane_idx = LaneIndex(lane_pos);
                if lane.pool == pool_idx && !order.contains(&lane_idx) {
                    order.push(lane_idx);
                }
            }
            self.pools[pool_pos].lanes = order;
        }

        for pool_pos in 0..self.pools.len() {
            if self.pools[pool_pos].lanes.is_empty() {
                self.add_synthetic_lane(PoolIndex(pool_pos));
            }
        }

        Ok(())
    }

    fn add_synthetic_lane(&mut self, pool: PoolIndex) -> LaneIndex {
        let id = self.pools[pool.0].id.create_nested(Id::synthetic("lane"));
        let idx = LaneIndex(self.lanes.len());
        trace!(lane:% = id; "Adding synthetic lane");
        self.lanes.push(FlowLane {
            id,
            name: None,
            pool,
            nodes: Vec::new(),
        });
        self.lane_indices.insert(id, idx);
        self.pools[pool.0].lanes.push(idx);
        idx
    }

    fn default_lane(&mut self) -> LaneIndex {
        let pool = match self.default_pool {
            Some(pool) => pool,
            None => {
                let pool = PoolIndex(self.pools.len());
                self.pools.push(FlowPool {
                    id: Id::synthetic("pool"),
                    name: None,
                    lanes: Vec::new(),
                });
                self.add_synthetic_lane(pool);
                self.default_pool = Some(pool);
                pool
            }
        };
        self.pools[pool.0].lanes[0]
    }

    fn add_nodes(&mut self, model: &ModelGraph) -> Result<(), SwimlaneError> {
        for (pos, node) in model.nodes().iter().enumerate() {
            self.node_indices.insert(node.id(), NodeIndex(pos));
        }

        for node in model.nodes() {
            let mut detached = None;
            let mut missing_host = None;
            let mut frame = None;

            if node.is_boundary() {
                match node.attached_host() {
                    Some(host) if host == node.id() => {
                        return Err(SwimlaneError::malformed(
                            node.id(),
                            "boundary event is attached to itself",
                        ));
                    }
                    Some(host) => match self.node_indices.get(&host) {
                        Some(&host_idx) => {
                            let host_node = &model.nodes()[host_idx.0];
                            if host_node.is_boundary() {
                                return Err(SwimlaneError::malformed(
                                    node.id(),
                                    format!("boundary event is attached to boundary event `{host}`"),
                                ));
                            }
                            frame = Some(Frame::Host(host_idx));
                        }
                        None => missing_host = Some(Some(host)),
                    },
                    None => missing_host = Some(None),
                }
            }

            let frame = match (frame, node.parent_subprocess()) {
                (Some(frame), _) => frame,
                (None, Some(parent)) if parent == node.id() => {
                    return Err(SwimlaneError::malformed(
                        node.id(),
                        "node is nested inside itself",
                    ));
                }
                (None, Some(parent)) => match self.node_indices.get(&parent) {
                    Some(&parent_idx) => Frame::Subprocess(parent_idx),
                    None => {
                        detached = Some(Detachment::MissingParent(parent));
                        Frame::Root
                    }
                },
                (None, None) => Frame::Root,
            };

            self.nodes.push(FlowNode {
                id: node.id(),
                kind: node.kind(),
                size: node.size(),
                position: node.position(),
                frame,
                lane: None,
                pool: None,
                detached,
                missing_host,
            });
        }

        Ok(())
    }

    fn add_edges(&mut self, model: &ModelGraph) -> Result<(), SwimlaneError> {
        for edge in model.edges() {
            let endpoint = |id: Id, role: &str| {
                self.node_indices.get(&id).copied().ok_or_else(|| {
                    SwimlaneError::malformed(
                        edge.id(),
                        format!("edge {role} references missing node `{id}`"),
                    )
                })
            };
            let source = endpoint(edge.source(), "source")?;
            let target = endpoint(edge.target(), "target")?;
            self.edges.push(FlowEdge {
                id: edge.id(),
                kind: edge.kind(),
                source,
                target,
                waypoints: edge.waypoints().to_vec(),
            });
        }
        Ok(())
    }

    /// Topological order of the nesting forest, outermost first.
    fn nesting_order(&self) -> Result<Vec<NodeIndex>, SwimlaneError> {
        let mut nesting = DiGraph::<NodeIndex, ()>::with_capacity(self.nodes.len(), 0);
        let graph_indices: Vec<_> = (0..self.nodes.len())
            .map(|pos| nesting.add_node(NodeIndex(pos)))
            .collect();

        for (pos, node) in self.nodes.iter().enumerate() {
            if let Frame::Subprocess(owner) | Frame::Host(owner) = node.frame {
                nesting.add_edge(graph_indices[owner.0], graph_indices[pos], ());
            }
        }

        toposort(&nesting, None)
            .map(|order| order.into_iter().map(|idx| nesting[idx]).collect())
            .map_err(|cycle| {
                let node = &self.nodes[nesting[cycle.node_id()].0];
                SwimlaneError::malformed(node.id, "subprocess nesting forms a cycle")
            })
    }

    fn assign_lanes(
        &mut self,
        model: &ModelGraph,
        order: &[NodeIndex],
    ) -> Result<(), SwimlaneError> {
        let mut claimed: IndexMap<NodeIndex, LaneIndex> = IndexMap::new();
        for lane in model.lanes() {
            let lane_idx = self.lane_indices[&lane.id()];
            for node_id in lane.nodes() {
                let node_idx = *self.node_indices.get(node_id).ok_or_else(|| {
                    SwimlaneError::malformed(
                        lane.id(),
                        format!("lane references missing node `{node_id}`"),
                    )
                })?;
                claimed.entry(node_idx).or_insert(lane_idx);
            }
        }

        // Outermost first so owners are resolved before the nodes they contain.
        for &idx in order {
            let node = &model.nodes()[idx.0];
            let frame = self.nodes[idx.0].frame;

            let lane = match frame {
                Frame::Subprocess(owner) | Frame::Host(owner) => {
                    if self.nodes[owner.0].detached.is_some() {
                        None
                    } else {
                        self.nodes[owner.0].lane
                    }
                }
                Frame::Root if self.nodes[idx.0].detached.is_some() => None,
                Frame::Root => match (node.lane(), claimed.get(&idx), node.pool()) {
                    (Some(lane_id), _, _) => match self.lane_indices.get(&lane_id) {
                        Some(&lane_idx) => Some(lane_idx),
                        None => {
                            self.nodes[idx.0].detached = Some(Detachment::UnknownLane(lane_id));
                            None
                        }
                    },
                    (None, Some(&lane_idx), _) => Some(lane_idx),
                    (None, None, Some(pool_id)) => match self.pool_indices.get(&pool_id) {
                        Some(&pool_idx) => Some(self.pools[pool_idx.0].lanes[0]),
                        None => {
                            self.nodes[idx.0].detached = Some(Detachment::UnknownPool(pool_id));
                            None
                        }
                    },
                    (None, None, None) => Some(self.default_lane()),
                },
            };

            self.nodes[idx.0].lane = lane;
            self.nodes[idx.0].pool = lane.map(|lane| self.lanes[lane.0].pool);
        }

        // Lane members: lane-listed nodes in list order, then the rest in
        // declaration order.
        let mut members: Vec<Vec<NodeIndex>> = vec![Vec::new(); self.lanes.len()];
        for lane in model.lanes() {
            let lane_idx = self.lane_indices[&lane.id()];
            for node_id in lane.nodes() {
                let node_idx = self.node_indices[node_id];
                if self.is_lane_member(node_idx, lane_idx) && !members[lane_idx.0].contains(&node_idx)
                {
                    members[lane_idx.0].push(node_idx);
                }
            }
        }
        for pos in 0..self.nodes.len() {
            let node_idx = NodeIndex(pos);
            let Some(lane_idx) = self.nodes[pos].lane else {
                continue;
            };
            if self.is_lane_member(node_idx, lane_idx) && !members[lane_idx.0].contains(&node_idx) {
                members[lane_idx.0].push(node_idx);
            }
        }
        for (lane, nodes) in self.lanes.iter_mut().zip(members) {
            lane.nodes = nodes;
        }

        Ok(())
    }

    fn is_lane_member(&self, node: NodeIndex, lane: LaneIndex) -> bool {
        let node = &self.nodes[node.0];
        node.frame == Frame::Root && node.detached.is_none() && node.lane == Some(lane)
    }
}

#[cfg(test)]
mod tests {
    use swimlane_core::model::{Edge, Lane, Node, Pool};

    use super::*;

    fn two_lane_pool() -> ModelGraph {
        ModelGraph::new()
            .with_pool(Pool::new("shop").with_lanes(["front".into(), "back".into()]))
            .with_lane(Lane::new("front", "shop"))
            .with_lane(Lane::new("back", "shop"))
    }

    fn malformed_id(result: Result<FlowGraph, SwimlaneError>) -> Id {
        match result {
            Err(SwimlaneError::MalformedGraph { id, .. }) => id,
            other => panic!("expected malformed graph error, got {other:?}"),
        }
    }

    #[test]
    fn test_lane_membership_and_order() {
        let model = two_lane_pool()
            .with_lane(Lane::new("extra", "shop"))
            .with_node(Node::new("a", NodeKind::Task).with_lane("back"))
            .with_node(Node::new("b", NodeKind::Task).with_pool("shop"))
            .with_node(Node::new("c", NodeKind::Task).with_lane("back"));

        let graph = FlowGraph::from_model(&model).unwrap();
        let pool = &graph.pools()[0];
        let lane_ids: Vec<_> = pool.lanes().iter().map(|&l| graph.lane(l).id()).collect();

        assert_eq!(lane_ids, vec![Id::new("front"), Id::new("back"), Id::new("extra")]);

        let back = graph.lane(pool.lanes()[1]);
        let members: Vec<_> = back.nodes().iter().map(|&n| graph.node(n).id()).collect();
        assert_eq!(members, vec![Id::new("a"), Id::new("c")]);

        // A node with only a pool lands in that pool's first lane.
        let b = graph.node(graph.node_index("b".into()).unwrap());
        assert_eq!(b.lane(), Some(pool.lanes()[0]));
    }

    #[test]
    fn test_lane_listed_nodes_come_first() {
        let model = ModelGraph::new()
            .with_pool(Pool::new("p"))
            .with_lane(Lane::new("l", "p").with_nodes(["second".into()]))
            .with_node(Node::new("first", NodeKind::Task).with_lane("l"))
            .with_node(Node::new("second", NodeKind::Task));

        let graph = FlowGraph::from_model(&model).unwrap();
        let members: Vec<_> = graph.lanes()[0]
            .nodes()
            .iter()
            .map(|&n| graph.node(n).id())
            .collect();

        assert_eq!(members, vec![Id::new("second"), Id::new("first")]);
    }

    #[test]
    fn test_laneless_pool_gets_synthetic_lane() {
        let model = ModelGraph::new()
            .with_pool(Pool::new("supplier"))
            .with_node(Node::new("ship", NodeKind::Task).with_pool("supplier"));

        let graph = FlowGraph::from_model(&model).unwrap();

        assert_eq!(graph.pools()[0].lanes().len(), 1);
        let lane = graph.lane(graph.pools()[0].lanes()[0]);
        assert_eq!(lane.id(), "supplier::__lane");
        assert!(lane.id().is_synthetic());
        assert_eq!(lane.nodes().len(), 1);
    }

    #[test]
    fn test_nodes_without_pool_get_default_pool() {
        let model = ModelGraph::new()
            .with_node(Node::new("a", NodeKind::StartEvent))
            .with_node(Node::new("b", NodeKind::Task));

        let graph = FlowGraph::from_model(&model).unwrap();

        assert_eq!(graph.pools().len(), 1);
        assert_eq!(graph.pools()[0].id(), "__pool");
        assert_eq!(graph.lanes()[0].nodes().len(), 2);
    }

    #[test]
    fn test_edge_with_missing_node_is_malformed() {
        let model = ModelGraph::new()
            .with_node(Node::new("a", NodeKind::Task))
            .with_edge(Edge::new("dangling", "a", "nowhere"));

        assert_eq!(malformed_id(FlowGraph::from_model(&model)), "dangling");
    }

    #[test]
    fn test_lane_with_missing_pool_is_malformed() {
        let model = ModelGraph::new().with_lane(Lane::new("orphan", "ghost"));
        assert_eq!(malformed_id(FlowGraph::from_model(&model)), "orphan");
    }

    #[test]
    fn test_duplicate_ids_are_malformed() {
        let model = ModelGraph::new()
            .with_node(Node::new("twice", NodeKind::Task))
            .with_node(Node::new("twice", NodeKind::EndEvent));

        assert_eq!(malformed_id(FlowGraph::from_model(&model)), "twice");
    }

    #[test]
    fn test_cyclic_nesting_is_malformed() {
        let model = ModelGraph::new()
            .with_node(Node::new("outer", NodeKind::SubProcess).with_parent_subprocess("inner"))
            .with_node(Node::new("inner", NodeKind::SubProcess).with_parent_subprocess("outer"));

        let id = malformed_id(FlowGraph::from_model(&model));
        assert!(id == "outer" || id == "inner");
    }

    #[test]
    fn test_frames_and_containers_innermost_first() {
        let model = ModelGraph::new()
            .with_node(Node::new("outer", NodeKind::SubProcess))
            .with_node(Node::new("inner", NodeKind::SubProcess).with_parent_subprocess("outer"))
            .with_node(Node::new("leaf", NodeKind::Task).with_parent_subprocess("inner"))
            .with_node(Node::boundary("timer", "outer"));

        let graph = FlowGraph::from_model(&model).unwrap();
        let idx = |name: &str| graph.node_index(name.into()).unwrap();

        assert_eq!(graph.node(idx("inner")).frame(), Frame::Subprocess(idx("outer")));
        assert_eq!(graph.node(idx("timer")).frame(), Frame::Host(idx("outer")));
        assert_eq!(graph.containers(), &[idx("inner"), idx("outer")]);

        // Nested nodes report the lane of their outermost ancestor.
        assert_eq!(graph.node(idx("leaf")).lane(), graph.node(idx("outer")).lane());
        assert_eq!(graph.scope(idx("leaf")), Scope::Subprocess(idx("inner")));
        assert_eq!(graph.rank_anchor(idx("timer")), idx("outer"));
    }

    #[test]
    fn test_recoverable_problems_detach_nodes() {
        let model = two_lane_pool()
            .with_node(Node::new("lost", NodeKind::Task).with_parent_subprocess("ghost"))
            .with_node(Node::new("stray", NodeKind::Task).with_lane("nowhere"))
            .with_node(Node::boundary("timer", "missing").with_lane("front"));

        let graph = FlowGraph::from_model(&model).unwrap();
        let node = |name: &str| graph.node(graph.node_index(name.into()).unwrap());

        assert_eq!(
            node("lost").detachment(),
            Some(&Detachment::MissingParent(Id::new("ghost")))
        );
        assert_eq!(
            node("stray").detachment(),
            Some(&Detachment::UnknownLane(Id::new("nowhere")))
        );

        // A boundary event without a host stays a regular lane member.
        let timer = node("timer");
        assert_eq!(timer.missing_host(), Some(Some(Id::new("missing"))));
        assert_eq!(timer.frame(), Frame::Root);
        assert!(timer.detachment().is_none());
        assert_eq!(graph.frame_nodes(Frame::Root).count(), 1);
    }
}
