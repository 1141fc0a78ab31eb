//! Advisory events emitted at each phase boundary of a resolution.
//!
//! Observers cannot influence the layout; they only watch it. The default
//! [`LogObserver`] forwards every event to the `log` facade as a structured
//! record.

use log::{debug, info, warn};

use swimlane_core::identifier::Id;

use crate::layout::rank::RankStats;

/// A phase boundary of [`PositionResolver::resolve`].
///
/// `scope` is the subprocess whose interior the event is about, the host
/// whose boundary events it is about, or `None` for the root frame.
///
/// [`PositionResolver::resolve`]: crate::layout::PositionResolver::resolve
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    RanksAssigned {
        scope: Option<Id>,
        stats: RankStats,
    },
    AdapterApplied {
        scope: Option<Id>,
        adapter: String,
        nodes: usize,
    },
    AdapterDeclined {
        scope: Option<Id>,
        adapter: String,
        reason: String,
    },
    LanesOrganized {
        pools: usize,
        lane_heights: Vec<(Id, f32)>,
    },
    BoundaryEventsPlaced {
        events: usize,
        orphaned: usize,
    },
    /// Lanes were grown or restacked around their members.
    LanesRefit {
        grown: usize,
        shifted: usize,
    },
    OverlapsResolved {
        scope: Option<Id>,
        passes: usize,
        displaced: usize,
        unresolved: usize,
    },
    FallbackApplied {
        nodes: usize,
    },
    EdgesRouted {
        edges: usize,
        crossing: usize,
        kept: usize,
    },
}

/// Receives [`LayoutEvent`]s while a resolution runs.
pub trait LayoutObserver {
    fn on_event(&self, event: &LayoutEvent);
}

/// Observer that writes every event to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LayoutObserver for LogObserver {
    fn on_event(&self, event: &LayoutEvent) {
        match event {
            LayoutEvent::RanksAssigned { scope, stats } => debug!(
                scope:? = scope.map(|id| id.to_string()),
                nodes = stats.nodes,
                max_rank = stats.max_rank,
                requeues = stats.requeues,
                back_edges = stats.back_edges,
                unreachable = stats.unreachable;
                "Ranks assigned"
            ),
            LayoutEvent::AdapterApplied {
                scope,
                adapter,
                nodes,
            } => info!(
                scope:? = scope.map(|id| id.to_string()),
                adapter = adapter.as_str(),
                nodes = *nodes;
                "External layout applied"
            ),
            LayoutEvent::AdapterDeclined {
                scope,
                adapter,
                reason,
            } => warn!(
                scope:? = scope.map(|id| id.to_string()),
                adapter = adapter.as_str(),
                reason = reason.as_str();
                "External layout declined, using internal layout"
            ),
            LayoutEvent::LanesOrganized {
                pools,
                lane_heights,
            } => {
                info!(pools = *pools, lanes = lane_heights.len(); "Lanes organized");
                for (lane, height) in lane_heights {
                    debug!(lane:% = lane, height = *height; "Lane height");
                }
            }
            LayoutEvent::BoundaryEventsPlaced { events, orphaned } => {
                debug!(events = *events, orphaned = *orphaned; "Boundary events placed")
            }
            LayoutEvent::LanesRefit { grown, shifted } => {
                debug!(grown = *grown, shifted = *shifted; "Lanes refit")
            }
            LayoutEvent::OverlapsResolved {
                scope,
                passes,
                displaced,
                unresolved,
            } => {
                if *unresolved > 0 {
                    warn!(
                        scope:? = scope.map(|id| id.to_string()),
                        passes = *passes,
                        displaced = *displaced,
                        unresolved = *unresolved;
                        "Overlaps remain after the last pass"
                    );
                } else {
                    debug!(
                        scope:? = scope.map(|id| id.to_string()),
                        passes = *passes,
                        displaced = *displaced;
                        "Overlaps resolved"
                    );
                }
            }
            LayoutEvent::FallbackApplied { nodes } => {
                warn!(nodes = *nodes; "Nodes placed on the fallback grid")
            }
            LayoutEvent::EdgesRouted {
                edges,
                crossing,
                kept,
            } => debug!(
                edges = *edges,
                crossing = *crossing,
                kept = *kept;
                "Edges routed"
            ),
        }
    }
}
