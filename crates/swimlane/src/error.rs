//! Error types for swimlane operations.
//!
//! This module provides the main error type [`SwimlaneError`]. Conditions the
//! layout pipeline can recover from are not errors; they are reported as
//! [`LayoutWarning`](swimlane_core::positioned::LayoutWarning)s on the
//! positioned model instead.

use std::io;

use thiserror::Error;

use swimlane_core::identifier::Id;

/// The main error type for swimlane operations.
///
/// # Diagnostic Variants
///
/// The `Input` variant keeps the decoded source next to the TOML error so
/// that its byte span can be rendered by rich error reporters.
#[derive(Debug, Error)]
pub enum SwimlaneError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Input { err: toml::de::Error, src: String },

    #[error("Malformed graph at `{id}`: {reason}")]
    MalformedGraph { id: Id, reason: String },

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for SwimlaneError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl SwimlaneError {
    /// Create a new `Input` error with the associated source text.
    pub fn new_input_error(err: toml::de::Error, src: impl Into<String>) -> Self {
        Self::Input {
            err,
            src: src.into(),
        }
    }

    pub(crate) fn malformed(id: Id, reason: impl Into<String>) -> Self {
        Self::MalformedGraph {
            id,
            reason: reason.into(),
        }
    }
}
