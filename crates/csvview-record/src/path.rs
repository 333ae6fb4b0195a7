//! Dotted field paths
//!
//! Provides [`FieldPath`] for addressing values inside nested records.

use crate::cell::{Cell, NotScalar};
use crate::value::Value;
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path into a nested record
///
/// Segments are separated by `.` in the textual form. Each segment indexes
/// a mapping by key, or a list by position when it parses as an index.
///
/// # Examples
/// - `User.username` → `record["User"]["username"]`
/// - `tags.0` → first element of `record["tags"]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(SmallVec<[String; 4]>);

impl FieldPath {
    /// Create path from segments
    ///
    /// # Errors
    /// Returns error if there are no segments or one of them is empty
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Result<Self, PathError> {
        let segments: SmallVec<[String; 4]> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment);
        }
        Ok(Self(segments))
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a parsed path has at least one segment
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walk the record along this path
    ///
    /// Returns `None` as soon as a key is absent, an index is out of range,
    /// or the current value is not a container.
    #[must_use]
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(record, |current, segment| match current {
            Value::Map(map) => map.get(segment.as_str()),
            Value::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Resolve into a cell
    ///
    /// An unresolved path is [`Cell::Missing`], never an error.
    ///
    /// # Errors
    /// Returns error if the path lands on a list or mapping
    pub fn cell(&self, record: &Value) -> Result<Cell, NotScalar> {
        self.resolve(record).map_or(Ok(Cell::Missing), Cell::try_from)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        Self::new(s.split('.'))
    }
}

/// Errors related to field paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No segments at all
    #[error("field path is empty")]
    Empty,

    /// Empty segment in path
    #[error("field path contains empty segment")]
    EmptySegment,
}
