//! Position resolution for process diagrams.
//!
//! This module turns a validated [`ModelGraph`] into a [`PositionedModel`]
//! whose every node, lane, pool and edge carries absolute coordinates.
//!
//! # Pipeline Position
//!
//! ```text
//! ModelGraph
//!     ↓ structure
//! FlowGraph (arena with frames and lane membership)
//!     ↓ rank → external → lanes (per frame, innermost first)
//!     ↓ boundary → overlap → fallback
//!     ↓ translate to absolute, route edges
//! PositionedModel
//!     ↓ export
//! Output
//! ```
//!
//! # Submodules
//!
//! - [`rank`] - Longest-path rank assignment that tolerates loops
//! - [`external`] - Optional third-party layout adapters
//! - [`lanes`] - Lane bands, pool stacking and column slotting
//! - [`boundary`] - Boundary events on their host's edge, frame translation
//! - [`overlap`] - Bounded pairwise overlap avoidance among siblings
//! - [`routing`] - Orthogonal waypoint routing
//! - [`fallback`] - Grid placement for nodes the pipeline cannot place
//! - [`events`] - Phase events and observers
//!
//! # Re-exports
//!
//! - [`PositionResolver`] - Runs the whole pipeline
//!
//! [`ModelGraph`]: swimlane_core::model::ModelGraph
//! [`PositionedModel`]: swimlane_core::positioned::PositionedModel

pub mod boundary;
pub mod events;
pub mod external;
pub mod fallback;
pub mod lanes;
pub mod overlap;
pub mod rank;
mod resolver;
pub mod routing;
mod working;

pub use boundary::BoundaryPositioner;
pub use events::{LayoutEvent, LayoutObserver, LogObserver};
pub use external::{LayoutAdapter, LayoutRequest, SugiyamaAdapter};
pub use fallback::FallbackGrid;
pub use lanes::LaneOrganizer;
pub use overlap::{Displacement, OverlapAvoidance, OverlapReport, Sibling};
pub use rank::{RankAssigner, RankStats, Ranking};
pub use resolver::PositionResolver;
pub use routing::{RouteRequest, WaypointRouter};
