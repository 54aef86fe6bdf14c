//! Serializers for laid-out process diagrams.
//!
//! - [`bpmn::BpmnExporter`] writes BPMN 2.0 XML with diagram interchange.
//! - [`svg::SvgExporter`] writes a standalone SVG preview.

pub mod bpmn;
pub mod svg;

use crate::structure::ProcessDiagram;

/// Turns a [`ProcessDiagram`] into a document.
pub trait Exporter {
    fn export(&self, diagram: &ProcessDiagram<'_>) -> Result<String, Error>;
}

#[derive(Debug)]
pub enum Error {
    Render(String),
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

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
