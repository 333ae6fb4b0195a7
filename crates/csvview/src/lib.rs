//! CsvView - CSV export view
//!
//! The view the web layer hands its datasets to:
//! - Holds named datasets ("view variables") and rendering options
//! - Selects which datasets are serialized, in which order
//! - Flattens records through an optional extraction spec
//! - Adds optional header and footer rows
//! - Returns the encoded document with its `text/csv` content type
//!
//! # Example
//!
//! ```rust
//! use csvview::prelude::*;
//!
//! let vars = serde_json::json!({
//!     "user": [
//!         { "User": { "id": 1, "username": "jose" } },
//!         { "User": { "id": 2 } }
//!     ],
//!     "_serialize": "user",
//!     "_extract": [["User.id", "%03d"], "User.username"],
//!     "_eol": "\n"
//! });
//!
//! let rendered = CsvView::from_view_vars(vars)?.render()?;
//! assert_eq!(rendered.text(), Some("001,jose\n002,\n"));
//! # Ok::<(), csvview::CsvViewError>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod error;
pub mod options;
pub mod view;

pub use error::{CsvViewError, CsvViewResult};
pub use options::{ExtractOption, Serialize, ViewOptions};
pub use view::{CsvView, Dataset, RenderStream, RenderedCsv};

pub use csvview_extract::{ExtractError, ExtractionSpec, FormatPattern, Selector};
pub use csvview_record::{Cell, FieldPath, FlatRow, Value};
pub use csvview_writer::{
    EncodingError, FormatConfig, QuoteStyle, TextEncoding, WriteError, CONTENT_TYPE,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for rendering CSV views
    pub use crate::{
        Cell, CsvView, CsvViewError, CsvViewResult, Dataset, ExtractionSpec, FormatConfig,
        QuoteStyle, RenderedCsv, Selector, Serialize, Value, ViewOptions,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
