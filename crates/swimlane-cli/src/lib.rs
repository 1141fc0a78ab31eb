//! Swimlane CLI library
//!
//! This module contains the core CLI logic for the swimlane layout tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};

use std::fs;

use log::{info, warn};

use swimlane::{DiagramBuilder, SwimlaneError};

/// Run the swimlane CLI application
///
/// This function reads the process model, resolves every position and writes
/// either an SVG preview or the positioned model as TOML to the output file.
///
/// # Errors
///
/// Returns `SwimlaneError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid input documents
/// - Malformed graphs
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), SwimlaneError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing process model"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let model = builder.parse(&source)?;
    let positioned = builder.resolve(&model)?;

    for warning in positioned.warnings() {
        warn!(warning:% = warning; "Layout needs review");
    }

    let output = match args.format {
        OutputFormat::Svg => builder.render_svg(&positioned)?,
        OutputFormat::Toml => builder.to_toml(&positioned)?,
    };

    fs::write(&args.output, output)?;

    info!(output_file = args.output, format:? = args.format; "Positioned model exported successfully");

    Ok(())
}
