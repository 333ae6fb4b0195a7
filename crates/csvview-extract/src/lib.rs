//! CsvView Row Extraction
//!
//! Turns upstream records into flat rows of [`Cell`]s.
//!
//! # Modes
//!
//! - **Passthrough** (no spec): every record must already be a list of
//!   scalars, used as-is, or a mapping of scalars, written in key order
//! - **Selective**: an [`ExtractionSpec`] of [`Selector`]s derives exactly
//!   one cell per selector from every record
//!
//! # Example
//!
//! ```rust
//! use csvview_extract::{extract, ExtractionSpec, Selector};
//! use csvview_record::{Cell, Value};
//!
//! let records = vec![Value::map([("User", Value::map([("id", 7)]))])];
//! let spec = ExtractionSpec::new()
//!     .with(Selector::formatted("User.id", "%03d").unwrap())
//!     .with(Selector::path("User.name").unwrap());
//!
//! let rows: Vec<_> = extract(records, Some(&spec)).collect::<Result<_, _>>().unwrap();
//! assert_eq!(rows, vec![vec![Cell::Text("007".into()), Cell::Missing]]);
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;
mod pattern;
mod rows;
mod selector;

pub use error::ExtractError;
pub use pattern::{FormatPattern, TemporalFormats};
pub use rows::{extract, Rows};
pub use selector::{ComputeFn, ExtractionSpec, Selector};

pub use csvview_record::{Cell, FlatRow, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
