//! Error and diagnostic system for the blueprint loader.
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error with an optional error code, labelled source locations, and
//! help text. Diagnostics are wrapped in [`ParseError`] when returned from
//! [`crate::parse`].
//!
//! # Example
//!
//! ```
//! # use laneflow_parser::error::{Diagnostic, ErrorCode};
//! # use laneflow_parser::Span;
//!
//! let diag = Diagnostic::error("expected value")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(12..13), "here")
//!     .with_help("check for a trailing comma");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
