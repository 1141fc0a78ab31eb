//! The orchestrator running every layout phase in a fixed order.
//!
//! Each frame (the root and every subprocess interior) is ranked and
//! organized on its own, innermost subprocess first so that a container's
//! size is known before its parent frame is organized. Positions stay
//! frame-local until every displacement has happened and are translated to
//! absolute coordinates exactly once, right before edges are routed.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use indexmap::{IndexMap, IndexSet};
use log::{info, trace, warn};

use swimlane_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    model::{EdgeKind, ModelGraph},
    positioned::{
        LayoutWarning, PositionedEdge, PositionedLane, PositionedModel, PositionedNode,
        PositionedPool,
    },
};

use crate::{
    config::{LayoutConfig, LayoutEngine},
    error::SwimlaneError,
    layout::{
        boundary::BoundaryPositioner,
        events::{LayoutEvent, LayoutObserver, LogObserver},
        external::{LayoutAdapter, LayoutRequest, SugiyamaAdapter},
        fallback::FallbackGrid,
        lanes::{BandLayout, LaneOrganizer, Member, PoolBand, Slotting},
        overlap::{Displacement, OverlapAvoidance, Sibling},
        rank::RankAssigner,
        routing::{RouteRequest, WaypointRouter},
        working::WorkingCopy,
    },
    structure::{FlowGraph, Frame, NodeIndex, PoolIndex, Scope},
};

/// Resolves absolute positions for every element of a process model.
///
/// A resolver is configured once and can resolve any number of models. The
/// input model is never modified.
///
/// # Examples
///
/// ```
/// # use swimlane::{config::LayoutConfig, layout::PositionResolver};
/// # use swimlane::model::{Edge, Lane, ModelGraph, Node, NodeKind, Pool};
/// let model = ModelGraph::new()
///     .with_pool(Pool::new("orders"))
///     .with_lane(Lane::new("sales", "orders"))
///     .with_node(Node::new("receive", NodeKind::StartEvent).with_lane("sales"))
///     .with_node(Node::new("check", NodeKind::Task).with_lane("sales"))
///     .with_edge(Edge::new("f1", "receive", "check"));
///
/// let positioned = PositionResolver::new(LayoutConfig::default()).resolve(&model)?;
///
/// let receive = positioned.node("receive".into()).unwrap();
/// let check = positioned.node("check".into()).unwrap();
/// assert!(receive.bounds.max_x() < check.bounds.min_x());
/// # Ok::<(), swimlane::SwimlaneError>(())
/// ```
pub struct PositionResolver {
    config: LayoutConfig,
    adapter: Option<Box<dyn LayoutAdapter>>,
    observers: Vec<Box<dyn LayoutObserver>>,
}

impl PositionResolver {
    /// Creates a resolver that logs its phases through [`LogObserver`].
    ///
    /// With [`LayoutEngine::Sugiyama`] the resolver consults a
    /// [`SugiyamaAdapter`] for initial column positions.
    pub fn new(config: LayoutConfig) -> Self {
        let adapter: Option<Box<dyn LayoutAdapter>> = match config.engine() {
            LayoutEngine::Internal => None,
            LayoutEngine::Sugiyama => Some(Box::new(
                SugiyamaAdapter::new(config.adapter_timeout()).with_margin(config.column_margin()),
            )),
        };

        Self {
            config,
            adapter,
            observers: vec![Box::new(LogObserver)],
        }
    }

    /// Replaces the external layout adapter.
    pub fn with_adapter(mut self, adapter: impl LayoutAdapter + 'static) -> Self {
        self.adapter = Some(Box::new(adapter));
        self
    }

    /// Adds an observer notified at every phase boundary.
    pub fn with_observer(mut self, observer: impl LayoutObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Resolves positions for `model`.
    ///
    /// Recoverable layout problems (an unresolvable overlap, a missing
    /// boundary host, a node that only the fallback grid could place) are
    /// reported as warnings on the returned model. A declined adapter is
    /// only reported to observers.
    ///
    /// # Errors
    ///
    /// Returns [`SwimlaneError::MalformedGraph`] when `model` references
    /// missing elements, repeats ids, or nests subprocesses cyclically.
    pub fn resolve(&self, model: &ModelGraph) -> Result<PositionedModel, SwimlaneError> {
        let graph = FlowGraph::from_model(model)?;
        let mut working = WorkingCopy::new(&graph);

        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            pools = graph.pools().len();
            "Resolving positions"
        );

        for &container in graph.containers() {
            self.layout_interior(&graph, &mut working, container);
        }
        self.layout_root(&graph, &mut working);
        self.place_boundary_events(&graph, &mut working);

        for &container in graph.containers() {
            self.resolve_overlaps(&graph, &mut working, Frame::Subprocess(container));
            self.fit_container(&graph, &mut working, container);
        }
        self.resolve_overlaps(&graph, &mut working, Frame::Root);
        // Restacked lanes carry their nodes down, possibly onto pinned ones.
        if self.refit_lanes(&graph, &mut working) {
            self.resolve_overlaps(&graph, &mut working, Frame::Root);
            self.refit_lanes(&graph, &mut working);
        }
        self.place_stranded(&graph, &mut working);

        let absolute = BoundaryPositioner::new().to_absolute(&graph, &working.locals());
        let edges = self.route_edges(&graph, &working, &absolute);

        let positioned = assemble(&graph, working, &absolute, edges);
        info!(
            nodes = positioned.nodes().len(),
            warnings = positioned.warnings().len();
            "Positions resolved"
        );
        Ok(positioned)
    }

    fn emit(&self, event: &LayoutEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    fn layout_interior(&self, graph: &FlowGraph, working: &mut WorkingCopy, container: NodeIndex) {
        let members: Vec<NodeIndex> = graph.frame_nodes(Frame::Subprocess(container)).collect();
        let organizer = LaneOrganizer::interior(&self.config);
        let scope = Some(graph.node(container).id());

        self.layout_frame(graph, working, scope, &organizer, &[vec![members]]);
        self.fit_container(graph, working, container);
    }

    fn layout_root(&self, graph: &FlowGraph, working: &mut WorkingCopy) {
        let pools: Vec<Vec<Vec<NodeIndex>>> = graph
            .pools()
            .iter()
            .map(|pool| {
                pool.lanes()
                    .iter()
                    .map(|&lane| graph.lane(lane).nodes().to_vec())
                    .collect()
            })
            .collect();
        let organizer = LaneOrganizer::new(&self.config);

        let layout = self.layout_frame(graph, working, None, &organizer, &pools);

        let mut lane_heights = Vec::new();
        for (pool_idx, band) in graph.pool_indices().zip(&layout.pools) {
            working.set_pool(pool_idx, band.bounds);
            for (&lane_idx, lane_band) in graph.pool(pool_idx).lanes().iter().zip(&band.lanes) {
                working.set_lane(lane_idx, *lane_band);
                lane_heights.push((graph.lane(lane_idx).id(), lane_band.height));
            }
        }

        self.emit(&LayoutEvent::LanesOrganized {
            pools: layout.pools.len(),
            lane_heights,
        });
    }

    /// Ranks, optionally consults the adapter, and organizes one frame.
    /// Nodes with an input position keep it.
    fn layout_frame(
        &self,
        graph: &FlowGraph,
        working: &mut WorkingCopy,
        scope: Option<Id>,
        organizer: &LaneOrganizer,
        pools: &[Vec<Vec<NodeIndex>>],
    ) -> BandLayout<NodeIndex> {
        let nodes: Vec<NodeIndex> = pools.iter().flatten().flatten().copied().collect();
        let members: IndexSet<NodeIndex> = nodes.iter().copied().collect();

        let edges: Vec<(NodeIndex, NodeIndex)> = graph
            .edges()
            .iter()
            .filter(|edge| edge.kind() == EdgeKind::SequenceFlow)
            .filter_map(|edge| {
                let source = lift_into(graph, edge.source(), &members)?;
                let target = lift_into(graph, edge.target(), &members)?;
                (source != target).then_some((source, target))
            })
            .collect();

        let ranking = RankAssigner::new().assign(&nodes, &edges);
        self.emit(&LayoutEvent::RanksAssigned {
            scope,
            stats: ranking.stats(),
        });

        let sizes: IndexMap<NodeIndex, Size> =
            nodes.iter().map(|&idx| (idx, working.size(idx))).collect();
        let x_hints = self.external_hints(graph, scope, &edges, &sizes);

        let layout = organizer.organize(
            pools,
            &Slotting {
                columns: ranking.columns(),
                sizes: &sizes,
                x_hints: x_hints.as_ref(),
            },
        );

        for &idx in &nodes {
            let size = working.size(idx);
            let placement = working.placement_mut(idx);
            placement.rank = ranking.rank(idx);
            placement.local = match graph.node(idx).position() {
                Some(position) => {
                    placement.pinned = true;
                    Some(Bounds::new_from_top_left(position, size))
                }
                None => layout.nodes.get(&idx).copied(),
            };
        }

        layout
    }

    /// Left edges proposed by the external adapter, relative to the first
    /// column, or `None` when there is no adapter or it declined.
    fn external_hints(
        &self,
        graph: &FlowGraph,
        scope: Option<Id>,
        edges: &[(NodeIndex, NodeIndex)],
        sizes: &IndexMap<NodeIndex, Size>,
    ) -> Option<IndexMap<NodeIndex, f32>> {
        let adapter = self.adapter.as_deref()?;

        let request = sizes.iter().fold(LayoutRequest::new(), |request, (&idx, &size)| {
            request.with_node(graph.node(idx).id(), size)
        });
        let request = edges.iter().fold(request, |request, &(source, target)| {
            request.with_edge(graph.node(source).id(), graph.node(target).id())
        });
        if request.is_empty() {
            return None;
        }

        let centers = match panic::catch_unwind(AssertUnwindSafe(|| adapter.try_layout(&request)))
        {
            Ok(Some(centers)) => centers,
            Ok(None) => {
                return self.decline(scope, adapter, "no layout produced".to_string());
            }
            Err(payload) => {
                let reason = format!("adapter panicked: {}", panic_message(&*payload));
                return self.decline(scope, adapter, reason);
            }
        };

        let lefts: IndexMap<NodeIndex, f32> = sizes
            .iter()
            .filter_map(|(&idx, size)| {
                let center = centers.get(&graph.node(idx).id())?;
                Some((idx, center.x() - size.width() / 2.0))
            })
            .filter(|(_, left)| left.is_finite())
            .collect();
        if lefts.is_empty() {
            return self.decline(scope, adapter, "no usable coordinates".to_string());
        }

        let min_left = lefts.values().copied().fold(f32::INFINITY, f32::min);
        let shift = self.config.column_margin() / 2.0 - min_left;

        self.emit(&LayoutEvent::AdapterApplied {
            scope,
            adapter: adapter.name().to_string(),
            nodes: lefts.len(),
        });

        Some(
            lefts
                .into_iter()
                .map(|(idx, left)| (idx, left + shift))
                .collect(),
        )
    }

    /// A decline is recovered here: observers hear about it, the caller
    /// does not.
    fn decline<T>(&self, scope: Option<Id>, adapter: &dyn LayoutAdapter, reason: String) -> Option<T> {
        self.emit(&LayoutEvent::AdapterDeclined {
            scope,
            adapter: adapter.name().to_string(),
            reason,
        });
        None
    }

    /// Grows `container` until its interior nodes fit, keeping its boundary
    /// events on the bottom edge. Containers never shrink.
    fn fit_container(&self, graph: &FlowGraph, working: &mut WorkingCopy, container: NodeIndex) {
        let padding = self.config.subprocess_padding();
        let current = working.size(container);
        let needed = graph
            .frame_nodes(Frame::Subprocess(container))
            .filter_map(|idx| working.local(idx))
            .fold(current, |size, bounds| {
                size.max(Size::new(bounds.max_x() + padding, bounds.max_y() + padding))
            });
        if needed == current {
            return;
        }

        trace!(
            container:% = graph.node(container),
            width = needed.width(),
            height = needed.height();
            "Growing container to fit its interior"
        );
        working.set_size(container, needed);

        let grown = needed.height() - current.height();
        if grown > 0.0 {
            for event in graph.boundary_events(container) {
                if let Some(bounds) = working.local(event) {
                    working.set_local(event, bounds.translate(Point::new(0.0, grown)));
                }
            }
        }
    }

    fn place_boundary_events(&self, graph: &FlowGraph, working: &mut WorkingCopy) {
        let positioner = BoundaryPositioner::new();
        let mut events = 0;

        for host in graph.node_indices() {
            let attached: Vec<NodeIndex> = graph.boundary_events(host).collect();
            if attached.is_empty() {
                continue;
            }

            let sizes: Vec<Size> = attached.iter().map(|&idx| working.size(idx)).collect();
            let placed = positioner.place_on_host(working.size(host), &sizes);
            let host_origin = working.local(host).map(Bounds::min_point);

            for ((&idx, size), bounds) in attached.iter().zip(sizes).zip(placed) {
                // Input positions share the host's frame.
                let local = match (graph.node(idx).position(), host_origin) {
                    (Some(position), Some(origin)) => {
                        working.placement_mut(idx).pinned = true;
                        Bounds::new_from_top_left(position.sub_point(origin), size)
                    }
                    (Some(_), None) => {
                        let node = graph.node(idx).id();
                        let host = graph.node(host).id();
                        warn!(
                            node:% = node,
                            host:% = host;
                            "Ignoring boundary event position, its host has no position yet"
                        );
                        working.flag(
                            idx,
                            LayoutWarning::FallbackPlacement {
                                node,
                                reason: format!("host `{host}` has no position to anchor it to"),
                            },
                        );
                        bounds
                    }
                    (None, _) => bounds,
                };
                working.set_local(idx, local);
                events += 1;
            }
        }

        let mut orphaned = 0;
        for idx in graph.node_indices() {
            let node = graph.node(idx);
            if let Some(host) = node.missing_host() {
                working.flag(
                    idx,
                    LayoutWarning::MissingBoundaryHost {
                        node: node.id(),
                        host,
                    },
                );
                orphaned += 1;
            }
        }

        self.emit(&LayoutEvent::BoundaryEventsPlaced { events, orphaned });

        for host in graph.node_indices() {
            if graph.boundary_events(host).nth(1).is_some() {
                self.resolve_overlaps(graph, working, Frame::Host(host));
            }
        }
    }

    fn resolve_overlaps(&self, graph: &FlowGraph, working: &mut WorkingCopy, frame: Frame) {
        let (scope, displacement) = match frame {
            Frame::Subprocess(owner) => (Some(graph.node(owner).id()), Displacement::LeastOverlap),
            // Lane members slide along their lane, boundary events along
            // their host's edge.
            Frame::Host(owner) => (Some(graph.node(owner).id()), Displacement::Forward),
            Frame::Root => (None, Displacement::Forward),
        };

        let mut siblings: Vec<Sibling<NodeIndex>> = graph
            .frame_nodes(frame)
            .filter_map(|idx| {
                Some(Sibling {
                    key: idx,
                    rank: working.placement(idx).rank,
                    order: idx.index(),
                    bounds: working.local(idx)?,
                })
            })
            .collect();

        let report = OverlapAvoidance::new(self.config.overlap_passes())
            .with_displacement(displacement)
            .resolve_overlaps(&mut siblings);

        for sibling in &siblings {
            working.set_local(sibling.key, sibling.bounds);
        }
        for &idx in &report.displaced {
            working.placement_mut(idx).displaced = true;
        }
        for &idx in &report.unresolved {
            let node = graph.node(idx).id();
            working.flag(idx, LayoutWarning::UnresolvedOverlap { node });
        }

        self.emit(&LayoutEvent::OverlapsResolved {
            scope,
            passes: report.passes,
            displaced: report.displaced.len(),
            unresolved: report.unresolved.len(),
        });
    }

    /// Grows lanes and pools around their members after pinning and
    /// displacement. Returns true when unpinned nodes moved with their lane.
    fn refit_lanes(&self, graph: &FlowGraph, working: &mut WorkingCopy) -> bool {
        let mut pool_indices: Vec<PoolIndex> = Vec::new();
        let mut bands: Vec<PoolBand> = Vec::new();
        let mut members: Vec<Vec<Vec<Member<NodeIndex>>>> = Vec::new();

        for pool_idx in graph.pool_indices() {
            let pool = graph.pool(pool_idx);
            let Some(bounds) = working.pool(pool_idx) else {
                continue;
            };
            let Some(lanes) = pool
                .lanes()
                .iter()
                .map(|&lane| working.lane(lane))
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };

            let lane_members = pool
                .lanes()
                .iter()
                .map(|&lane| {
                    graph
                        .lane(lane)
                        .nodes()
                        .iter()
                        .filter(|&&idx| {
                            let node = graph.node(idx);
                            node.frame() == Frame::Root && node.detachment().is_none()
                        })
                        .filter_map(|&idx| {
                            Some(Member {
                                key: idx,
                                bounds: working.local(idx)?,
                                pinned: working.placement(idx).pinned,
                            })
                        })
                        .collect()
                })
                .collect();

            pool_indices.push(pool_idx);
            bands.push(PoolBand { bounds, lanes });
            members.push(lane_members);
        }

        let refit = LaneOrganizer::new(&self.config).refit(&mut bands, &members);

        for (&idx, &shift) in &refit.shifts {
            if let Some(bounds) = working.local(idx) {
                working.set_local(idx, bounds.translate(Point::new(0.0, shift)));
            }
        }
        for (pool_idx, band) in pool_indices.into_iter().zip(bands) {
            working.set_pool(pool_idx, band.bounds);
            for (&lane_idx, lane_band) in graph.pool(pool_idx).lanes().iter().zip(band.lanes) {
                working.set_lane(lane_idx, lane_band);
            }
        }

        self.emit(&LayoutEvent::LanesRefit {
            grown: refit.grown,
            shifted: refit.shifts.len(),
        });
        !refit.shifts.is_empty()
    }

    /// Puts detached nodes, and any root node the pipeline left without a
    /// position, on the fallback grid below the diagram.
    fn place_stranded(&self, graph: &FlowGraph, working: &mut WorkingCopy) {
        let stranded: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&idx| {
                let node = graph.node(idx);
                node.detachment().is_some()
                    || (node.frame() == Frame::Root && working.local(idx).is_none())
            })
            .collect();
        if stranded.is_empty() {
            return;
        }

        let occupied = working.root_extent(graph);
        let sizes: Vec<Size> = stranded.iter().map(|&idx| working.size(idx)).collect();
        let placed = FallbackGrid::new(self.config.fallback_spacing()).place(occupied, &sizes);

        for (&idx, bounds) in stranded.iter().zip(placed) {
            let node = graph.node(idx);
            let reason = node
                .detachment()
                .map_or_else(|| "no position computed".to_string(), ToString::to_string);
            working.set_local(idx, bounds);
            working.flag(
                idx,
                LayoutWarning::FallbackPlacement {
                    node: node.id(),
                    reason,
                },
            );
        }

        self.emit(&LayoutEvent::FallbackApplied {
            nodes: stranded.len(),
        });
    }

    fn route_edges(
        &self,
        graph: &FlowGraph,
        working: &WorkingCopy,
        absolute: &[Option<Bounds>],
    ) -> Vec<PositionedEdge> {
        let router = WaypointRouter::new(self.config.node_spacing());
        let mut routed = Vec::with_capacity(graph.edges().len());
        let mut crossing = 0;
        let mut kept = 0;

        for edge in graph.edges() {
            let (source, target) = (edge.source(), edge.target());
            let source_scope = graph.scope(source);
            let crosses_boundary =
                source_scope != graph.scope(target) || source_scope == Scope::Detached;

            let frame_origin = if crosses_boundary {
                crossing += 1;
                Point::default()
            } else {
                match source_scope {
                    Scope::Lane(lane) => working
                        .lane(lane)
                        .map_or_else(Point::default, |band| band.bounds.min_point()),
                    Scope::Subprocess(owner) => {
                        absolute[owner.index()].map_or_else(Point::default, Bounds::min_point)
                    }
                    Scope::Detached => Point::default(),
                }
            };

            let keep_input = !edge.waypoints().is_empty()
                && working.is_anchored(graph, source)
                && working.is_anchored(graph, target);
            let waypoints = if keep_input {
                kept += 1;
                edge.waypoints().to_vec()
            } else {
                match (absolute[source.index()], absolute[target.index()]) {
                    (Some(source_bounds), Some(target_bounds)) => router.route(&RouteRequest {
                        source: source_bounds,
                        target: target_bounds,
                        kind: edge.kind(),
                        from_boundary: graph.node(source).is_boundary(),
                        self_loop: source == target,
                    }),
                    _ => Vec::new(),
                }
            };

            routed.push(PositionedEdge {
                id: edge.id(),
                kind: edge.kind(),
                source: graph.node(source).id(),
                target: graph.node(target).id(),
                crosses_boundary,
                waypoints,
                frame_origin,
            });
        }

        self.emit(&LayoutEvent::EdgesRouted {
            edges: routed.len(),
            crossing,
            kept,
        });
        routed
    }
}

impl Default for PositionResolver {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

/// Walks `idx` up its frame owners until it reaches one of `members`.
fn lift_into(
    graph: &FlowGraph,
    mut idx: NodeIndex,
    members: &IndexSet<NodeIndex>,
) -> Option<NodeIndex> {
    loop {
        if members.contains(&idx) {
            return Some(idx);
        }
        match graph.node(idx).frame() {
            Frame::Root => return None,
            Frame::Subprocess(owner) | Frame::Host(owner) => idx = owner,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn assemble(
    graph: &FlowGraph,
    working: WorkingCopy,
    absolute: &[Option<Bounds>],
    edges: Vec<PositionedEdge>,
) -> PositionedModel {
    let mut pools = Vec::with_capacity(graph.pools().len());
    let mut lanes = Vec::with_capacity(graph.lanes().len());

    for pool_idx in graph.pool_indices() {
        let pool = graph.pool(pool_idx);
        let bounds = working.pool(pool_idx).unwrap_or_default();

        for &lane_idx in pool.lanes() {
            let Some(band) = working.lane(lane_idx) else {
                continue;
            };
            let lane = graph.lane(lane_idx);
            lanes.push(PositionedLane {
                id: lane.id(),
                pool: pool.id(),
                name: lane.name().map(str::to_string),
                y_offset: band.y_offset,
                height: band.height,
                bounds: band.bounds,
            });
        }

        pools.push(PositionedPool {
            id: pool.id(),
            name: pool.name().map(str::to_string),
            x_offset: bounds.min_x(),
            lanes: pool.lanes().iter().map(|&lane| graph.lane(lane).id()).collect(),
            bounds,
        });
    }

    let (placements, warnings) = working.into_parts();
    let nodes = graph
        .node_indices()
        .map(|idx| {
            let node = graph.node(idx);
            let parent = match node.frame() {
                Frame::Root => None,
                Frame::Subprocess(owner) | Frame::Host(owner) => Some(graph.node(owner).id()),
            };
            PositionedNode {
                id: node.id(),
                kind: node.kind(),
                rank: placements[graph.rank_anchor(idx).index()].rank,
                lane: node.lane().map(|lane| graph.lane(lane).id()),
                pool: node.pool().map(|pool| graph.pool(pool).id()),
                parent,
                needs_review: placements[idx.index()].needs_review,
                bounds: absolute[idx.index()].unwrap_or_default(),
            }
        })
        .collect();

    PositionedModel::new(pools, lanes, nodes, edges, warnings)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use float_cmp::assert_approx_eq;
    use swimlane_core::model::{Edge, Lane, Node, NodeKind, Pool};

    use super::*;

    fn resolver() -> PositionResolver {
        PositionResolver::new(LayoutConfig::default())
    }

    fn two_lane_model() -> ModelGraph {
        ModelGraph::new()
            .with_pool(Pool::new("p"))
            .with_lane(Lane::new("l1", "p"))
            .with_lane(Lane::new("l2", "p"))
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<LayoutEvent>>>);

    impl LayoutObserver for Recorder {
        fn on_event(&self, event: &LayoutEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    struct FixedAdapter(IndexMap<Id, Point>);

    impl LayoutAdapter for FixedAdapter {
        fn try_layout(&self, _request: &LayoutRequest) -> Option<IndexMap<Id, Point>> {
            Some(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct PanickingAdapter;

    impl LayoutAdapter for PanickingAdapter {
        fn try_layout(&self, _request: &LayoutRequest) -> Option<IndexMap<Id, Point>> {
            panic!("adapter exploded");
        }
    }

    #[test]
    fn test_sequence_flow_advances_columns() {
        let model = two_lane_model()
            .with_node(Node::new("a", NodeKind::Task).with_lane("l1"))
            .with_node(Node::new("b", NodeKind::Task).with_lane("l2"))
            .with_edge(Edge::new("e", "a", "b"));

        let positioned = resolver().resolve(&model).unwrap();
        let a = positioned.node("a".into()).unwrap();
        let b = positioned.node("b".into()).unwrap();

        assert_eq!((a.rank, b.rank), (0, 1));
        assert!(a.bounds.max_x() < b.bounds.min_x());
        assert!(a.bounds.max_y() <= b.bounds.min_y());
    }

    #[test]
    fn test_message_flow_does_not_rank() {
        let model = ModelGraph::new()
            .with_pool(Pool::new("p1"))
            .with_pool(Pool::new("p2"))
            .with_node(Node::new("a", NodeKind::Task).with_pool("p1"))
            .with_node(Node::new("b", NodeKind::Task).with_pool("p2"))
            .with_edge(Edge::new("m", "a", "b").with_kind(EdgeKind::MessageFlow));

        let positioned = resolver().resolve(&model).unwrap();

        assert_eq!(positioned.node("b".into()).unwrap().rank, 0);
        assert!(positioned.edge("m".into()).unwrap().crosses_boundary);
    }

    #[test]
    fn test_subprocess_grows_to_fit_interior() {
        let model = ModelGraph::new()
            .with_node(
                Node::new("sub", NodeKind::SubProcess).with_size(Size::new(120.0, 90.0)),
            )
            .with_node(Node::new("t1", NodeKind::Task).with_parent_subprocess("sub"))
            .with_node(Node::new("t2", NodeKind::Task).with_parent_subprocess("sub"))
            .with_edge(Edge::new("e", "t1", "t2"));

        let positioned = resolver().resolve(&model).unwrap();
        let sub = positioned.node("sub".into()).unwrap();

        for child in ["t1", "t2"] {
            let child = positioned.node(child.into()).unwrap();
            assert_eq!(child.parent, Some("sub".into()));
            assert!(child.bounds.min_x() >= sub.bounds.min_x());
            assert!(child.bounds.max_x() <= sub.bounds.max_x());
            assert!(child.bounds.max_y() <= sub.bounds.max_y());
        }
        assert!(sub.bounds.width() > 120.0);
    }

    #[test]
    fn test_unknown_lane_goes_to_fallback_grid() {
        let model = two_lane_model()
            .with_node(Node::new("a", NodeKind::Task).with_lane("l1"))
            .with_node(Node::new("lost", NodeKind::Task).with_lane("nowhere"));

        let positioned = resolver().resolve(&model).unwrap();
        let lost = positioned.node("lost".into()).unwrap();
        let pool = positioned.pool("p".into()).unwrap();

        assert!(lost.needs_review);
        assert!(lost.bounds.min_y() > pool.bounds.max_y());
        assert!(positioned.warnings().iter().any(|warning| matches!(
            warning,
            LayoutWarning::FallbackPlacement { node, .. } if *node == "lost"
        )));
    }

    #[test]
    fn test_orphaned_boundary_event_is_flagged() {
        let model = two_lane_model()
            .with_node(Node::new("a", NodeKind::Task).with_lane("l1"))
            .with_node(Node::boundary("timer", "ghost").with_lane("l1"));

        let positioned = resolver().resolve(&model).unwrap();
        let timer = positioned.node("timer".into()).unwrap();

        assert!(timer.needs_review);
        assert_eq!(timer.lane, Some("l1".into()));
        assert!(positioned.warnings().contains(&LayoutWarning::MissingBoundaryHost {
            node: "timer".into(),
            host: Some("ghost".into()),
        }));
    }

    #[test]
    fn test_boundary_event_takes_host_rank() {
        let model = two_lane_model()
            .with_node(Node::new("start", NodeKind::StartEvent).with_lane("l1"))
            .with_node(Node::new("task", NodeKind::Task).with_lane("l1"))
            .with_node(Node::boundary("timer", "task"))
            .with_node(Node::new("escalate", NodeKind::Task).with_lane("l2"))
            .with_edge(Edge::new("e1", "start", "task"))
            .with_edge(Edge::new("e2", "timer", "escalate"));

        let positioned = resolver().resolve(&model).unwrap();

        assert_eq!(positioned.node("timer".into()).unwrap().rank, 1);
        assert_eq!(positioned.node("escalate".into()).unwrap().rank, 2);
        let route = &positioned.edge("e2".into()).unwrap().waypoints;
        let timer = positioned.node("timer".into()).unwrap();
        assert_eq!(route.first(), Some(&timer.bounds.bottom_center()));
    }

    #[test]
    fn test_adapter_x_hints_are_used() {
        let centers: IndexMap<Id, Point> = [
            (Id::new("a"), Point::new(100.0, 0.0)),
            (Id::new("b"), Point::new(600.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let model = two_lane_model()
            .with_node(Node::new("a", NodeKind::Task).with_lane("l1"))
            .with_node(Node::new("b", NodeKind::Task).with_lane("l1"))
            .with_edge(Edge::new("e", "a", "b"));

        let positioned = resolver()
            .with_adapter(FixedAdapter(centers))
            .resolve(&model)
            .unwrap();
        let a = positioned.node("a".into()).unwrap();
        let b = positioned.node("b".into()).unwrap();
        let lane = positioned.lane("l1".into()).unwrap();

        assert_approx_eq!(f32, b.bounds.min_x() - a.bounds.min_x(), 500.0, epsilon = 0.01);
        assert_approx_eq!(f32, a.bounds.center().y(), lane.bounds.center().y(), epsilon = 0.01);
        assert!(positioned.warnings().is_empty());
    }

    #[test]
    fn test_panicking_adapter_is_declined() {
        let model = two_lane_model()
            .with_node(Node::new("a", NodeKind::Task).with_lane("l1"))
            .with_node(Node::new("b", NodeKind::Task).with_lane("l2"))
            .with_edge(Edge::new("e", "a", "b"));
        let recorder = Recorder::default();

        let positioned = resolver()
            .with_adapter(PanickingAdapter)
            .with_observer(recorder.clone())
            .resolve(&model)
            .unwrap();

        assert!(positioned.warnings().is_empty());
        assert!(positioned.node("a".into()).unwrap().bounds.max_x()
            < positioned.node("b".into()).unwrap().bounds.min_x());
        assert!(recorder.0.borrow().iter().any(|event| matches!(
            event,
            LayoutEvent::AdapterDeclined { scope: None, adapter, reason }
                if adapter == "external" && reason.contains("adapter exploded")
        )));
    }

    #[test]
    fn test_pinned_waypoints_are_kept() {
        let waypoints = vec![Point::new(150.0, 100.0), Point::new(300.0, 100.0)];
        let model = two_lane_model()
            .with_node(
                Node::new("a", NodeKind::Task)
                    .with_lane("l1")
                    .with_position(Point::new(50.0, 60.0)),
            )
            .with_node(
                Node::new("b", NodeKind::Task)
                    .with_lane("l1")
                    .with_position(Point::new(300.0, 60.0)),
            )
            .with_edge(Edge::new("e", "a", "b").with_waypoints(waypoints.clone()));

        let positioned = resolver().resolve(&model).unwrap();

        assert_eq!(positioned.edge("e".into()).unwrap().waypoints, waypoints);
    }

    #[test]
    fn test_displaced_pin_reroutes_edge() {
        let model = two_lane_model()
            .with_node(
                Node::new("a", NodeKind::Task)
                    .with_lane("l1")
                    .with_position(Point::new(50.0, 60.0)),
            )
            .with_node(
                Node::new("b", NodeKind::Task)
                    .with_lane("l1")
                    .with_position(Point::new(90.0, 60.0)),
            )
            .with_edge(
                Edge::new("e", "a", "b")
                    .with_waypoints(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]),
            );

        let positioned = resolver().resolve(&model).unwrap();
        let a = positioned.node("a".into()).unwrap();
        let b = positioned.node("b".into()).unwrap();
        let edge = positioned.edge("e".into()).unwrap();

        assert!(!a.bounds.intersects(&b.bounds));
        assert_eq!(edge.waypoints.first(), Some(&a.bounds.right_center()));
    }

    #[test]
    fn test_pinned_node_grows_its_lane_and_pushes_later_lanes() {
        let model = two_lane_model()
            .with_node(
                Node::new("low", NodeKind::Task)
                    .with_lane("l1")
                    .with_position(Point::new(50.0, 200.0)),
            )
            .with_node(Node::new("next", NodeKind::Task).with_lane("l2"));

        let positioned = resolver().resolve(&model).unwrap();
        let low = positioned.node("low".into()).unwrap();
        let next = positioned.node("next".into()).unwrap();
        let l1 = positioned.lane("l1".into()).unwrap();
        let l2 = positioned.lane("l2".into()).unwrap();
        let pool = positioned.pool("p".into()).unwrap();

        assert_eq!(low.bounds.min_point(), Point::new(50.0, 200.0));
        assert!(low.bounds.max_y() <= l1.bounds.max_y());
        assert_approx_eq!(f32, l2.y_offset, l1.height, epsilon = 0.001);
        assert!(next.bounds.min_y() >= l2.bounds.min_y());
        assert!(next.bounds.max_y() <= l2.bounds.max_y());
        assert_approx_eq!(f32, pool.bounds.max_y(), l2.bounds.max_y(), epsilon = 0.001);
        assert!(positioned.warnings().is_empty());
    }

    #[test]
    fn test_event_position_on_unplaced_host_is_flagged() {
        let model = two_lane_model()
            .with_node(Node::new("task", NodeKind::Task).with_lane("ghost"))
            .with_node(Node::boundary("timer", "task").with_position(Point::new(5.0, 5.0)));

        let positioned = resolver().resolve(&model).unwrap();
        let task = positioned.node("task".into()).unwrap();
        let timer = positioned.node("timer".into()).unwrap();

        assert!(timer.needs_review);
        assert_eq!(timer.bounds.center(), task.bounds.bottom_center());
        assert!(positioned.warnings().iter().any(|warning| matches!(
            warning,
            LayoutWarning::FallbackPlacement { node, reason }
                if *node == "timer" && reason.contains("task")
        )));
    }

    #[test]
    fn test_events_cover_every_phase() {
        let model = two_lane_model()
            .with_node(Node::new("a", NodeKind::Task).with_lane("l1"))
            .with_node(Node::new("b", NodeKind::Task).with_lane("l2"))
            .with_edge(Edge::new("e", "a", "b"));
        let recorder = Recorder::default();

        resolver()
            .with_observer(recorder.clone())
            .resolve(&model)
            .unwrap();

        let events = recorder.0.borrow();
        assert!(matches!(events.first(), Some(LayoutEvent::RanksAssigned { scope: None, .. })));
        assert!(events.iter().any(|event| matches!(
            event,
            LayoutEvent::LanesOrganized { pools: 1, lane_heights } if lane_heights.len() == 2
        )));
        assert!(events.iter().any(|event| matches!(
            event,
            LayoutEvent::LanesRefit { grown: 0, shifted: 0 }
        )));
        assert!(matches!(
            events.last(),
            Some(LayoutEvent::EdgesRouted { edges: 1, crossing: 1, kept: 0 })
        ));
    }
}
