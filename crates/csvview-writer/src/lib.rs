//! CsvView Writer
//!
//! Serializes flat rows into CSV bytes.
//!
//! # Pipeline
//!
//! ```text
//! Cell → cell_text → quote_field → join(delimiter) + end_of_line → TextEncoding::encode → bytes
//! ```
//!
//! The preamble (byte-order mark, `sep=` line) is written once, before the
//! first row.
//!
//! # Example
//!
//! ```rust
//! use csvview_writer::{serialize, FormatConfig};
//! use csvview_record::Cell;
//!
//! let config = FormatConfig::new().with_end_of_line("\n");
//! let rows = vec![vec![Cell::from("Including,Comma"), Cell::from(3)]];
//!
//! assert_eq!(serialize(rows, &config).unwrap(), b"\"Including,Comma\",3\n");
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod config;
mod encoding;
mod error;
mod quote;
mod writer;

pub use config::{ConfigurationError, FormatConfig, QuoteStyle, DEFAULT_END_OF_LINE};
pub use encoding::{EncodingError, TextEncoding};
pub use error::WriteError;
pub use quote::{cell_text, quote_field};
pub use writer::{serialize, CsvWriter, RowEncoder};

/// MIME type of the rendered document
pub const CONTENT_TYPE: &str = "text/csv";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
