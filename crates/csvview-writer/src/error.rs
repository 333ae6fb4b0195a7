//! Error types for CSV serialization

use crate::config::ConfigurationError;
use crate::encoding::EncodingError;

/// Errors during CSV serialization
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Configuration rejected before writing
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Encoding failure outside any row (preamble, label lookup)
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Encoding failure while writing a row
    #[error("encoding error in row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: EncodingError,
    },

    /// Output sink failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WriteError {
    /// Create row-level encoding error
    pub fn row(row: usize, source: EncodingError) -> Self {
        Self::Row { row, source }
    }

    /// The encoding failure, wherever it happened
    #[must_use]
    pub fn encoding_error(&self) -> Option<&EncodingError> {
        match self {
            Self::Encoding(e) | Self::Row { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
