//! Command-line argument definitions for the Laneflow CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the output format,
//! the participant name, configuration file selection, and logging verbosity.

use std::path::Path;

use clap::{Parser, ValueEnum};

/// Document kinds the converter can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// BPMN 2.0 XML with diagram interchange
    Bpmn,
    /// SVG preview
    Svg,
}

/// Command-line arguments for the Laneflow converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input blueprint
    #[arg(help = "Path to the input JSON blueprint")]
    pub input: String,

    /// Path to the output file
    #[arg(short, long, default_value = "out.bpmn")]
    pub output: String,

    /// Output format; inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Participant name written to the BPMN collaboration
    #[arg(short, long)]
    pub name: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The requested format, or SVG for a `.svg` output path and BPMN otherwise.
    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_else(|| {
            let is_svg = Path::new(&self.output)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
            if is_svg {
                OutputFormat::Svg
            } else {
                OutputFormat::Bpmn
            }
        })
    }
}
