//! Configuration types for position resolution and preview rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field is optional and falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Spacing, lane sizing, overlap passes and the [`LayoutEngine`].
//! - [`StyleConfig`] - Colors used by the SVG preview.
//!
//! # Example
//!
//! ```
//! # use swimlane::config::{AppConfig, LayoutEngine};
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [layout]
//!     engine = "sugiyama"
//!     overlap_passes = 5
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.layout().engine(), LayoutEngine::Sugiyama);
//! assert_eq!(config.layout().overlap_passes(), 5);
//! assert_eq!(config.layout().lane_min_height(), 150.0);
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Which collaborator supplies initial coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    /// Rank columns and lane bands only.
    #[default]
    Internal,
    /// Try the Sugiyama layered layout first, falling back to the internal
    /// layout when it declines.
    Sugiyama,
}

/// Geometry settings of the layout pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    engine: LayoutEngine,
    lane_min_height: f32,
    lane_padding: f32,
    node_spacing: f32,
    column_margin: f32,
    pool_header_width: f32,
    pool_spacing: f32,
    subprocess_padding: f32,
    overlap_passes: usize,
    adapter_timeout_ms: u64,
    fallback_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::Internal,
            lane_min_height: 150.0,
            lane_padding: 20.0,
            node_spacing: 30.0,
            column_margin: 50.0,
            pool_header_width: 30.0,
            pool_spacing: 40.0,
            subprocess_padding: 20.0,
            overlap_passes: 3,
            adapter_timeout_ms: 2000,
            fallback_spacing: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_engine(mut self, engine: LayoutEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_lane_min_height(mut self, height: f32) -> Self {
        self.lane_min_height = height;
        self
    }

    pub fn with_overlap_passes(mut self, passes: usize) -> Self {
        self.overlap_passes = passes;
        self
    }

    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Returns the [`LayoutEngine`] that supplies initial coordinates.
    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    /// Lower bound for every lane's height.
    pub fn lane_min_height(&self) -> f32 {
        self.lane_min_height
    }

    /// Space above and below the tallest rank slot in a lane.
    pub fn lane_padding(&self) -> f32 {
        self.lane_padding
    }

    /// Vertical gap between nodes sharing a rank slot.
    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    /// Extra width added to each rank column.
    pub fn column_margin(&self) -> f32 {
        self.column_margin
    }

    /// Width of the label band on the left of every pool.
    pub fn pool_header_width(&self) -> f32 {
        self.pool_header_width
    }

    /// Vertical gap between stacked pools.
    pub fn pool_spacing(&self) -> f32 {
        self.pool_spacing
    }

    /// Padding between a subprocess border and its interior nodes.
    pub fn subprocess_padding(&self) -> f32 {
        self.subprocess_padding
    }

    /// Maximum number of overlap-resolution passes per container.
    pub fn overlap_passes(&self) -> usize {
        self.overlap_passes
    }

    /// Time budget for one external layout call.
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }

    /// Gap between cells of the fallback grid.
    pub fn fallback_spacing(&self) -> f32 {
        self.fallback_spacing
    }
}

/// Visual styling of the SVG preview.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    background_color: Option<String>,

    #[serde(default)]
    stroke_color: Option<String>,

    #[serde(default)]
    review_color: Option<String>,
}

impl StyleConfig {
    /// Background fill, or `None` for a transparent preview.
    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    pub fn stroke_color(&self) -> &str {
        self.stroke_color.as_deref().unwrap_or("#333333")
    }

    /// Outline color of nodes flagged for review.
    pub fn review_color(&self) -> &str {
        self.review_color.as_deref().unwrap_or("#d9480f")
    }
}
