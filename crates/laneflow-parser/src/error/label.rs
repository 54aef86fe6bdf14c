//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a location in the blueprint source.
///
/// ```text
/// error[E200]: invalid type: map, expected a string or integer id
///   --> onboarding.json:7:17
///    |
///  7 |       "lane_id": {"x": 1},
///    |                  ^ expected a node or lane id
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
