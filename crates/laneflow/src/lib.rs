//! Laneflow - lane-aware layout of process blueprints.
//!
//! Turns a JSON process blueprint (nodes, lanes and successor links) into a
//! BPMN 2.0 document with diagram interchange, or into an SVG preview. Nodes
//! are ranked on a sparse grid per lane, the grids are compacted, and the
//! ranks are mapped to shape bounds and orthogonal edge routes.

pub mod config;
pub mod export;
pub mod layout;
pub mod structure;

mod error;

pub use laneflow_core::{color, geometry, identifier, semantic};

pub use error::{LaneflowError, LayoutError, SpecError};

use log::{debug, info, trace};

use config::AppConfig;
use export::{Exporter, bpmn::BpmnExporter, svg::SvgExporter};
use structure::{GraphBuilder, ProcessDiagram};

/// Builder for parsing, laying out and rendering process blueprints.
///
/// # Examples
///
/// ```rust
/// use laneflow::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"{
///     "nodes": [
///         {"id": "1", "type": "Start", "name": "Start", "lane_id": "1", "next": "99"},
///         {"id": "99", "type": "Finish", "name": "Finish", "lane_id": "1", "next": null}
///     ],
///     "lanes": [{"id": "1", "name": "the_only_lane"}]
/// }"#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let blueprint = builder.parse(source).expect("Failed to parse");
/// let diagram = builder.build(&blueprint).expect("Failed to lay out");
/// let xml = builder.render_bpmn(&diagram).expect("Failed to render");
///
/// assert!(xml.contains("<bpmn:startEvent id=\"Node_1\""));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
    participant_name: Option<String>,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            participant_name: None,
        }
    }

    /// Names the BPMN participant, overriding the blueprint's own name.
    pub fn with_participant_name(mut self, name: impl Into<String>) -> Self {
        self.participant_name = Some(name.into());
        self
    }

    /// Parse a JSON blueprint.
    ///
    /// # Errors
    ///
    /// Returns [`LaneflowError::Parse`] carrying the source text and coded
    /// diagnostics when the document is not a well-formed blueprint.
    pub fn parse(&self, source: &str) -> Result<semantic::Blueprint, LaneflowError> {
        info!("Parsing blueprint");

        let blueprint =
            laneflow_parser::parse(source).map_err(|err| LaneflowError::new_parse_error(err, source))?;

        debug!(
            nodes = blueprint.nodes().map_or(0, <[_]>::len),
            lanes = blueprint.lanes().map_or(0, <[_]>::len);
            "Blueprint parsed successfully"
        );
        trace!(blueprint:?; "Parsed blueprint");

        Ok(blueprint)
    }

    /// Validate a blueprint and lay it out.
    ///
    /// # Errors
    ///
    /// Returns [`LaneflowError::Style`] for an unusable layout configuration,
    /// [`LaneflowError::InvalidSpecification`] for a blueprint that cannot be
    /// laid out and [`LaneflowError::Layout`] for grid conflicts.
    pub fn build<'a>(&self, blueprint: &'a semantic::Blueprint) -> Result<ProcessDiagram<'a>, LaneflowError> {
        let layout = self.config.layout();
        layout.validate().map_err(LaneflowError::Style)?;

        info!("Building process diagram");
        let diagram = GraphBuilder::new(layout).build(blueprint)?;

        let omitted = diagram.geometry().omitted();
        if !omitted.is_empty() {
            info!(omitted = omitted.len(); "Some elements were left out of the diagram");
        }
        Ok(diagram)
    }

    /// Render a laid-out diagram as BPMN 2.0 XML.
    ///
    /// # Errors
    ///
    /// Returns [`LaneflowError::Export`] when the XML cannot be written.
    pub fn render_bpmn(&self, diagram: &ProcessDiagram<'_>) -> Result<String, LaneflowError> {
        let mut exporter = BpmnExporter::new();
        if let Some(name) = &self.participant_name {
            exporter = exporter.with_participant_name(name.as_str());
        }
        Ok(exporter.export(diagram)?)
    }

    /// Render a laid-out diagram as an SVG preview.
    ///
    /// # Errors
    ///
    /// Returns [`LaneflowError::Style`] for unparsable configured colors and
    /// [`LaneflowError::Export`] when rendering fails.
    pub fn render_svg(&self, diagram: &ProcessDiagram<'_>) -> Result<String, LaneflowError> {
        let exporter = SvgExporter::new(self.config.style()).map_err(LaneflowError::Style)?;
        Ok(exporter.export(diagram)?)
    }
}
