//! Error codes for blueprint diagnostics.
//!
//! Error codes are organized by phase:
//! - `E1xx` - JSON syntax errors
//! - `E2xx` - Blueprint schema errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Malformed JSON.
    ///
    /// The text is not valid JSON at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before the document was complete.
    E101,

    // =========================================================================
    // Schema Errors (E2xx)
    // =========================================================================
    /// Schema mismatch.
    ///
    /// The document is valid JSON but a field has the wrong type, or a
    /// required node or lane field is missing.
    E200,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "malformed JSON",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E200 => "blueprint schema mismatch",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
