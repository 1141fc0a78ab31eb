//! Swimlane - position resolution for pooled, laned process diagrams
//!
//! This library takes a business-process graph (pools, lanes, flow nodes,
//! subprocesses, boundary events and the flows between them) and computes
//! absolute coordinates for every element. It can render the result as an
//! SVG preview or write it back out as TOML for a diagram writer.

pub mod config;
pub mod layout;

mod error;
mod export;
mod structure;

pub use swimlane_core::{geometry, identifier, model, positioned};

pub use error::SwimlaneError;

use log::{debug, info};

use config::AppConfig;
use export::Exporter;
use layout::PositionResolver;
use model::ModelGraph;
use positioned::PositionedModel;

/// Builder for parsing, resolving and rendering process diagrams.
///
/// # Examples
///
/// ```rust
/// use swimlane::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"
/// [[pool]]
/// id = "shop"
///
/// [[node]]
/// id = "start"
/// kind = "start_event"
/// pool = "shop"
///
/// [[node]]
/// id = "pack"
/// kind = "task"
/// pool = "shop"
///
/// [[edge]]
/// id = "f1"
/// source = "start"
/// target = "pack"
/// "#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let model = builder.parse(source).expect("Failed to parse");
/// let positioned = builder.resolve(&model).expect("Failed to resolve");
/// assert_eq!(positioned.nodes().len(), 2);
///
/// let svg = builder.render_svg(&positioned).expect("Failed to render");
/// assert!(svg.starts_with("<svg"));
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse a TOML process model.
    ///
    /// # Errors
    ///
    /// Returns [`SwimlaneError::Input`] when `source` is not a valid model
    /// document.
    pub fn parse(&self, source: &str) -> Result<ModelGraph, SwimlaneError> {
        info!("Parsing process model");
        let model: ModelGraph =
            toml::from_str(source).map_err(|err| SwimlaneError::new_input_error(err, source))?;
        debug!(
            pools = model.pools().len(),
            lanes = model.lanes().len(),
            nodes = model.nodes().len(),
            edges = model.edges().len();
            "Process model parsed"
        );
        Ok(model)
    }

    /// Resolve absolute positions for `model`.
    ///
    /// # Errors
    ///
    /// Returns [`SwimlaneError::MalformedGraph`] when the model references
    /// missing elements, repeats ids, or nests subprocesses cyclically.
    pub fn resolve(&self, model: &ModelGraph) -> Result<PositionedModel, SwimlaneError> {
        PositionResolver::new(self.config.layout().clone()).resolve(model)
    }

    /// Render a positioned model to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`SwimlaneError::Export`] when the document cannot be
    /// written.
    pub fn render_svg(&self, positioned: &PositionedModel) -> Result<String, SwimlaneError> {
        let mut svg_exporter = export::svg::SvgBuilder::new(Vec::new())
            .with_style(self.config.style())
            .build();

        svg_exporter.export_positioned_model(positioned)?;

        let svg_string = String::from_utf8(svg_exporter.into_inner())
            .map_err(|err| export::Error::Render(err.to_string()))?;

        info!("SVG rendered successfully");
        Ok(svg_string)
    }

    /// Serialize a positioned model to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SwimlaneError::Export`] when serialization fails.
    pub fn to_toml(&self, positioned: &PositionedModel) -> Result<String, SwimlaneError> {
        toml::to_string(positioned).map_err(|err| export::Error::Render(err.to_string()).into())
    }
}
