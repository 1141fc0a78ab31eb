//! Export functionality for positioned process diagrams.
//!
//! This module provides the [`Exporter`] trait that writes a resolved
//! [`PositionedModel`] in an output format. It is the final stage of the
//! pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! ModelGraph
//!     ↓ layout
//! PositionedModel
//!     ↓ export (this module)
//! Output
//! ```
//!
//! # Available Backends
//!
//! - [`svg`] - SVG output via [`svg::SvgBuilder`] and [`svg::Svg`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering rendering failures and I/O
//! errors. [`Error`] converts into [`SwimlaneError::Export`] at the crate
//! boundary.
//!
//! [`SwimlaneError::Export`]: crate::SwimlaneError::Export

/// SVG export backend.
pub mod svg;

use swimlane_core::positioned::PositionedModel;

/// Abstraction for diagram export backends.
pub trait Exporter {
    /// Writes `model` in the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the model cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_positioned_model(&mut self, model: &PositionedModel) -> Result<(), Error>;
}

/// Errors that can occur during diagram export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
