//! Error types for row extraction

use csvview_record::PathError;

/// Errors raised while building selectors or extracting rows
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Record or computed value does not have the shape the mode requires
    #[error("data shape error at record {index}: {reason}")]
    DataShape { index: usize, reason: String },

    /// Format pattern could not be parsed
    #[error("invalid format pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Field path could not be parsed
    #[error("invalid field path: {0}")]
    Path(#[from] PathError),
}

impl ExtractError {
    /// Create data shape error for a record
    pub fn data_shape(index: usize, reason: impl Into<String>) -> Self {
        Self::DataShape {
            index,
            reason: reason.into(),
        }
    }

    /// Create invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
