//! Mutable working copy of a resolution.
//!
//! Holds the frame-local bounds of every node while the phases run. It is
//! private to one [`PositionResolver::resolve`] call and is consumed when
//! the immutable positioned model is assembled.
//!
//! [`PositionResolver::resolve`]: super::PositionResolver::resolve

use swimlane_core::{
    geometry::{Bounds, Size},
    positioned::LayoutWarning,
};

use crate::{
    layout::lanes::LaneBand,
    structure::{FlowGraph, Frame, LaneIndex, NodeIndex, PoolIndex},
};

#[derive(Debug, Clone, Default)]
pub struct Placement {
    /// Bounds in the node's frame.
    pub local: Option<Bounds>,
    pub rank: usize,
    /// Position came from the input model.
    pub pinned: bool,
    /// Moved by overlap avoidance.
    pub displaced: bool,
    pub needs_review: bool,
}

#[derive(Debug)]
pub struct WorkingCopy {
    placements: Vec<Placement>,
    sizes: Vec<Size>,
    lanes: Vec<Option<LaneBand>>,
    pools: Vec<Option<Bounds>>,
    warnings: Vec<LayoutWarning>,
}

impl WorkingCopy {
    pub fn new(graph: &FlowGraph) -> Self {
        Self {
            placements: vec![Placement::default(); graph.nodes().len()],
            sizes: graph.nodes().iter().map(|node| node.size()).collect(),
            lanes: vec![None; graph.lanes().len()],
            pools: vec![None; graph.pools().len()],
            warnings: Vec::new(),
        }
    }

    pub fn placement(&self, idx: NodeIndex) -> &Placement {
        &self.placements[idx.index()]
    }

    pub fn placement_mut(&mut self, idx: NodeIndex) -> &mut Placement {
        &mut self.placements[idx.index()]
    }

    pub fn local(&self, idx: NodeIndex) -> Option<Bounds> {
        self.placements[idx.index()].local
    }

    pub fn set_local(&mut self, idx: NodeIndex, bounds: Bounds) {
        self.placements[idx.index()].local = Some(bounds);
    }

    /// Current size, grown beyond the declared one for containers.
    pub fn size(&self, idx: NodeIndex) -> Size {
        self.sizes[idx.index()]
    }

    /// Grows `idx` to `size`, keeping its top-left corner.
    pub fn set_size(&mut self, idx: NodeIndex, size: Size) {
        self.sizes[idx.index()] = size;
        let placement = &mut self.placements[idx.index()];
        if let Some(bounds) = placement.local {
            placement.local = Some(Bounds::new_from_top_left(bounds.min_point(), size));
        }
    }

    pub fn lane(&self, idx: LaneIndex) -> Option<LaneBand> {
        self.lanes[idx.index()]
    }

    pub fn set_lane(&mut self, idx: LaneIndex, band: LaneBand) {
        self.lanes[idx.index()] = Some(band);
    }

    pub fn pool(&self, idx: PoolIndex) -> Option<Bounds> {
        self.pools[idx.index()]
    }

    pub fn set_pool(&mut self, idx: PoolIndex, bounds: Bounds) {
        self.pools[idx.index()] = Some(bounds);
    }

    /// Flags `idx` for review and records `warning`.
    pub fn flag(&mut self, idx: NodeIndex, warning: LayoutWarning) {
        self.placements[idx.index()].needs_review = true;
        self.warnings.push(warning);
    }

    /// Frame-local bounds of all nodes, indexed by [`NodeIndex::index`].
    pub fn locals(&self) -> Vec<Option<Bounds>> {
        self.placements.iter().map(|placement| placement.local).collect()
    }

    /// Bounds of everything placed in the root frame.
    pub fn root_extent(&self, graph: &FlowGraph) -> Option<Bounds> {
        let nodes = graph
            .node_indices()
            .filter(|&idx| graph.node(idx).frame() == Frame::Root)
            .filter_map(|idx| self.local(idx));
        self.pools
            .iter()
            .flatten()
            .copied()
            .chain(nodes)
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// True when `idx` and all its frame owners sit where the input model
    /// put them.
    pub fn is_anchored(&self, graph: &FlowGraph, idx: NodeIndex) -> bool {
        let placement = self.placement(idx);
        if !placement.pinned || placement.displaced {
            return false;
        }
        match graph.node(idx).frame() {
            Frame::Root => true,
            Frame::Subprocess(owner) | Frame::Host(owner) => self.is_anchored(graph, owner),
        }
    }

    pub fn into_parts(self) -> (Vec<Placement>, Vec<LayoutWarning>) {
        (self.placements, self.warnings)
    }
}
