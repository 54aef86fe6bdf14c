//! Error types for laneflow operations.
//!
//! [`LaneflowError`] is the error returned by every [`crate::DiagramBuilder`]
//! stage. Blueprint validation failures are described by [`SpecError`] and
//! grid invariant violations by [`LayoutError`].

use std::io;

use thiserror::Error;

use laneflow_core::identifier::Id;
use laneflow_parser::error::ParseError;

/// The main error type for laneflow operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the blueprint source next to the diagnostics so
/// callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum LaneflowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Invalid specification: {0}")]
    InvalidSpecification(#[from] SpecError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Style error: {0}")]
    Style(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for LaneflowError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl LaneflowError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

/// A blueprint that cannot be laid out.
///
/// Raised by [`crate::structure::GraphBuilder`] before any layout work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("blueprint has no `nodes` collection")]
    MissingNodes,

    #[error("blueprint has no `lanes` collection")]
    MissingLanes,

    #[error("blueprint has no nodes")]
    EmptyNodes,

    #[error("node `{0}` is declared more than once")]
    DuplicateNode(Id),

    #[error("lane `{0}` is declared more than once")]
    DuplicateLane(Id),

    #[error("node `{node}` belongs to undeclared lane `{lane}`")]
    UnknownLane { node: Id, lane: Id },

    #[error("node `{node}` points to unknown node `{target}`")]
    UnknownTarget { node: Id, target: Id },
}

/// A violated layout invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("cell ({column}, {row}) is already taken by `{occupant}`, cannot place `{element}`")]
    GridConflict {
        element: Id,
        occupant: Id,
        column: usize,
        row: usize,
    },

    #[error("traversal reached `{0}`, which is not part of the graph")]
    UnknownNode(Id),
}

#[cfg(test)]
mod tests {
    use laneflow_parser::error::Diagnostic;

    use super::*;

    #[test]
    fn test_spec_error_display() {
        let err = LaneflowError::from(SpecError::UnknownTarget {
            node: Id::new("3"),
            target: Id::new("42"),
        });
        assert_eq!(
            err.to_string(),
            "Invalid specification: node `3` points to unknown node `42`"
        );
    }

    #[test]
    fn test_grid_conflict_display() {
        let err = LaneflowError::from(LayoutError::GridConflict {
            element: Id::new("b"),
            occupant: Id::new("a"),
            column: 1,
            row: 0,
        });
        assert_eq!(
            err.to_string(),
            "Layout error: cell (1, 0) is already taken by `a`, cannot place `b`"
        );
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let err = LaneflowError::new_parse_error(
            ParseError::from(Diagnostic::error("expected value")),
            "{",
        );
        match err {
            LaneflowError::Parse { err, src } => {
                assert_eq!(src, "{");
                assert_eq!(err.to_string(), "error: expected value");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
