//! Error types for the CSV view
//!
//! Wraps the pipeline errors and adds the failures that only exist at the
//! view level:
//! - Serializing a dataset that was never set
//! - Serializing a value that is not a record sequence
//! - Malformed view options

use csvview_extract::ExtractError;
use csvview_writer::{EncodingError, WriteError};

/// Main view error type
#[derive(Debug, thiserror::Error)]
pub enum CsvViewError {
    /// Record could not be flattened
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Row could not be serialized or written
    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    /// Named dataset was never set
    #[error("unknown dataset: '{0}'")]
    UnknownDataset(String),

    /// Named dataset is a single value, not a record sequence
    #[error("dataset '{0}' is not iterable")]
    NotIterable(String),

    /// View options could not be read
    #[error("invalid view options: {0}")]
    Options(String),
}

impl CsvViewError {
    /// Create options error
    #[inline]
    pub fn options(reason: impl Into<String>) -> Self {
        Self::Options(reason.into())
    }

    /// Check if error was raised before any output could exist
    #[inline]
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownDataset(_)
                | Self::NotIterable(_)
                | Self::Options(_)
                | Self::Extract(ExtractError::InvalidPattern { .. } | ExtractError::Path(_))
                | Self::Write(
                    WriteError::Configuration(_)
                        | WriteError::Encoding(
                            EncodingError::UnknownLabel(_) | EncodingError::Unsupported(_)
                        )
                )
        )
    }
}

/// Result alias for view operations
pub type CsvViewResult<T> = Result<T, CsvViewError>;
