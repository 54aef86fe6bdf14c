//! # Laneflow Parser
//!
//! Loads process blueprints written as JSON into the
//! [`laneflow_core::semantic::Blueprint`] model.
//!
//! ## Usage
//!
//! ```
//! # use laneflow_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"{
//!         "nodes": [
//!             {"id": "1", "type": "Start", "name": "Begin", "lane_id": "1", "next": "99"},
//!             {"id": "99", "type": "Finish", "name": "End", "lane_id": "1", "next": null}
//!         ],
//!         "lanes": [{"id": "1", "name": "default"}]
//!     }"#;
//!
//!     let blueprint = parse(source)?;
//!     assert_eq!(blueprint.nodes().map(<[_]>::len), Some(2));
//!     Ok(())
//! }
//! ```
//!
//! Structural checks that need the whole graph (duplicate ids, dangling
//! `next` targets, undeclared lanes) are not done here; they belong to the
//! graph builder in the `laneflow` crate.

mod blueprint;
pub mod error;
mod span;

pub use span::Span;

use log::{debug, trace};
use serde_json::error::Category;

use laneflow_core::semantic::Blueprint;

use blueprint::RawDocument;
use error::{Diagnostic, ErrorCode, ParseError};

/// Parse blueprint source text into a [`Blueprint`].
///
/// # Errors
///
/// Returns a [`ParseError`] carrying a located [`Diagnostic`] when the text
/// is not valid JSON ([`ErrorCode::E100`]), ends early
/// ([`ErrorCode::E101`]), or does not match the blueprint schema
/// ([`ErrorCode::E200`]).
pub fn parse(source: &str) -> Result<Blueprint, ParseError> {
    trace!(len = source.len(); "Parsing blueprint source");

    let document: RawDocument =
        serde_json::from_str(source).map_err(|err| json_diagnostic(source, &err))?;
    let blueprint = document.into_blueprint();

    debug!(
        nodes = blueprint.nodes().map_or(0, <[_]>::len),
        lanes = blueprint.lanes().map_or(0, <[_]>::len);
        "Blueprint parsed"
    );
    Ok(blueprint)
}

/// Converts a `serde_json` error into a located diagnostic.
fn json_diagnostic(source: &str, err: &serde_json::Error) -> Diagnostic {
    let span = Span::from_line_column(source, err.line(), err.column());

    let full = err.to_string();
    let message = match full.rfind(" at line ") {
        Some(idx) => full[..idx].to_string(),
        None => full,
    };

    let (code, label, help) = match err.classify() {
        Category::Eof => (
            ErrorCode::E101,
            "document ends here",
            "close every open `{`, `[` and string",
        ),
        Category::Data => (
            ErrorCode::E200,
            "does not match the blueprint schema",
            "nodes need `id`, `type` and `lane_id`; lanes need `id`; ids are strings or integers",
        ),
        Category::Syntax | Category::Io => (
            ErrorCode::E100,
            "invalid JSON",
            "check for missing commas, quotes or brackets",
        ),
    };

    Diagnostic::error(message)
        .with_code(code)
        .with_label(span, label)
        .with_help(help)
}

#[cfg(test)]
mod tests {
    use laneflow_core::{
        identifier::Id,
        semantic::{NodeKind, Successors},
    };

    use super::*;

    const FLOW_BLUEPRINT: &str = r#"{
        "name": "Flow example",
        "description": "Simple workflow with a flow node",
        "blueprint_spec": {
            "requirements": [],
            "nodes": [
                {"id": "1", "type": "Start", "name": "Start node", "next": "2", "lane_id": "1",
                 "parameters": {"input_schema": {}}},
                {"id": "2", "type": "Flow", "name": "Chooses bag", "lane_id": "1",
                 "next": {"1": "3", "default": "99"}},
                {"id": "3", "type": "SystemTask", "name": "Set to bag", "next": "99", "lane_id": "1",
                 "category": "setToBag"},
                {"id": "99", "type": "Finish", "name": "Finish node", "next": null, "lane_id": "1"}
            ],
            "lanes": [{"id": "1", "name": "default", "rule": ["fn", ["&", "args"], true]}],
            "environment": {}
        }
    }"#;

    fn first_diagnostic(source: &str) -> Diagnostic {
        let err = parse(source).unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
        err.diagnostics()[0].clone()
    }

    #[test]
    fn test_parse_envelope() {
        let blueprint = parse(FLOW_BLUEPRINT).unwrap();

        assert_eq!(blueprint.name(), Some("Flow example"));
        let nodes = blueprint.nodes().unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].kind(), NodeKind::Start);
        assert_eq!(nodes[0].next(), &Successors::Single(Id::new("2")));
        assert_eq!(nodes[1].kind(), NodeKind::Flow);
        assert_eq!(
            nodes[1].next().distinct_targets(),
            vec![Id::new("3"), Id::new("99")]
        );
        assert_eq!(nodes[3].next(), &Successors::None);
        assert_eq!(blueprint.lanes().unwrap()[0].name(), "default");
    }

    #[test]
    fn test_parse_bare_spec_with_integer_ids() {
        let source = r#"{
            "nodes": [
                {"id": 1, "type": "UserTask", "name": "Review", "lane_id": 7, "next": 2},
                {"id": 2, "type": "Finish", "lane_id": 7}
            ],
            "lanes": [{"id": 7, "name": "reviewers"}]
        }"#;

        let blueprint = parse(source).unwrap();
        let nodes = blueprint.nodes().unwrap();
        assert_eq!(nodes[0].id(), "1");
        assert_eq!(nodes[0].lane_id(), "7");
        assert_eq!(nodes[0].next(), &Successors::Single(Id::new("2")));
        assert_eq!(nodes[1].next(), &Successors::None);
        assert!(blueprint.name().is_none());
    }

    #[test]
    fn test_parse_missing_lanes_is_representable() {
        let blueprint = parse(r#"{"nodes": []}"#).unwrap();
        assert_eq!(blueprint.nodes().map(<[_]>::len), Some(0));
        assert!(blueprint.lanes().is_none());
    }

    #[test]
    fn test_syntax_error() {
        let source = "{\"nodes\": [,]}";
        let diag = first_diagnostic(source);

        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert!(!diag.message().contains(" at line "));
        let span = diag.labels()[0].span();
        assert_eq!(&source[span.start()..span.end()], ",");
    }

    #[test]
    fn test_eof_error() {
        let diag = first_diagnostic("{\"nodes\": [");
        assert_eq!(diag.code(), Some(ErrorCode::E101));
        assert!(diag.help().is_some());
    }

    #[test]
    fn test_schema_error() {
        let source = r#"{"nodes": [{"id": true, "type": "Start", "lane_id": "1"}], "lanes": []}"#;
        let diag = first_diagnostic(source);

        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert!(diag.message().contains("a string or integer id"));
    }

    #[test]
    fn test_missing_required_field() {
        let source = r#"{"nodes": [{"id": "1", "type": "Start"}], "lanes": []}"#;
        let diag = first_diagnostic(source);

        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert!(diag.message().contains("lane_id"));
    }
}
