//! CsvView Record Model
//!
//! The data shapes the CSV pipeline consumes.
//!
//! # Core Concepts
//!
//! - [`Value`]: an upstream record (query row, nested mapping or array)
//! - [`Cell`]: one scalar cell of a flattened row
//! - [`FieldPath`]: dotted address into nested mappings (`User.username`)
//!
//! # Example
//!
//! ```rust
//! use csvview_record::{Cell, FieldPath, Value};
//!
//! let record = Value::map([("User", Value::map([("username", Value::from("jose"))]))]);
//! let path: FieldPath = "User.username".parse().unwrap();
//!
//! assert_eq!(path.cell(&record).unwrap(), Cell::Text("jose".into()));
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod cell;
mod path;
mod value;

pub use cell::{Cell, FlatRow, NotScalar};
pub use path::{FieldPath, PathError};
pub use value::Value;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
