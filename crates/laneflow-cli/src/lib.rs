//! CLI logic for the Laneflow converter.
//!
//! Reads a JSON blueprint, lays it out and writes either BPMN 2.0 XML or an
//! SVG preview.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};

use std::fs;

use log::info;

use laneflow::{DiagramBuilder, LaneflowError};

/// Run the Laneflow CLI application
///
/// # Errors
///
/// Returns `LaneflowError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Invalid blueprints and layout errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), LaneflowError> {
    let format = args.output_format();
    info!(
        input_path = args.input,
        output_path = args.output,
        format:? = format;
        "Processing blueprint"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let mut builder = DiagramBuilder::new(app_config);
    if let Some(name) = &args.name {
        builder = builder.with_participant_name(name.as_str());
    }

    let blueprint = builder.parse(&source)?;
    let diagram = builder.build(&blueprint)?;
    let document = match format {
        OutputFormat::Bpmn => builder.render_bpmn(&diagram)?,
        OutputFormat::Svg => builder.render_svg(&diagram)?,
    };

    fs::write(&args.output, document)?;

    info!(output_file = args.output; "Diagram exported successfully");

    Ok(())
}
