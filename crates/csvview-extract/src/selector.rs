//! Field selectors and extraction specifications

use crate::error::ExtractError;
use crate::pattern::{FormatPattern, TemporalFormats};
use csvview_record::{Cell, FieldPath, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Computed column: derives a cell value from the whole record
pub type ComputeFn = dyn Fn(&Value) -> Value + Send + Sync;

/// Rule deriving one cell from one record
#[derive(Clone)]
pub enum Selector {
    /// Dotted path; unresolved paths give [`Cell::Missing`]
    Path(FieldPath),
    /// Dotted path whose value is formatted with a printf-style pattern
    Formatted(FieldPath, FormatPattern),
    /// Function of the whole record
    Computed(Arc<ComputeFn>),
}

impl Selector {
    /// Path selector from dotted text
    ///
    /// # Errors
    /// Returns error if the path has an empty segment
    pub fn path(path: &str) -> Result<Self, ExtractError> {
        Ok(Self::Path(path.parse()?))
    }

    /// Formatted path selector
    ///
    /// # Errors
    /// Returns error if the path or the pattern is invalid
    pub fn formatted(path: &str, pattern: &str) -> Result<Self, ExtractError> {
        Ok(Self::Formatted(path.parse()?, FormatPattern::parse(pattern)?))
    }

    /// Computed selector
    #[must_use]
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Evaluate against one record
    ///
    /// `index` is the record position, used for error reporting.
    ///
    /// # Errors
    /// Returns [`ExtractError::DataShape`] if the selected value is a list or
    /// mapping, or a text pattern meets undecoded bytes
    pub fn select(&self, record: &Value, index: usize) -> Result<Cell, ExtractError> {
        self.select_with(record, index, &TemporalFormats::default())
    }

    /// Evaluate with the formats a `%s` pattern uses for temporal cells
    ///
    /// # Errors
    /// Same as [`Selector::select`]
    pub fn select_with(
        &self,
        record: &Value,
        index: usize,
        formats: &TemporalFormats,
    ) -> Result<Cell, ExtractError> {
        match self {
            Self::Path(path) => path
                .cell(record)
                .map_err(|e| ExtractError::data_shape(index, format!("'{path}': {e}"))),
            Self::Formatted(path, pattern) => {
                let cell = path
                    .cell(record)
                    .map_err(|e| ExtractError::data_shape(index, format!("'{path}': {e}")))?;
                match pattern.apply_with(&cell, formats) {
                    None => Ok(Cell::Text(String::new())),
                    Some(Ok(text)) => Ok(Cell::Text(text)),
                    Some(Err(reason)) => Err(ExtractError::data_shape(
                        index,
                        format!("'{path}' with '{pattern}': {reason}"),
                    )),
                }
            }
            Self::Computed(f) => Cell::try_from(f(record)).map_err(|e| {
                ExtractError::data_shape(index, format!("computed column: {e}"))
            }),
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(&path.to_string()).finish(),
            Self::Formatted(path, pattern) => f
                .debug_tuple("Formatted")
                .field(&path.to_string())
                .field(&pattern.as_str())
                .finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

impl FromStr for Selector {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::path(s)
    }
}

impl TryFrom<(&str, &str)> for Selector {
    type Error = ExtractError;

    fn try_from((path, pattern): (&str, &str)) -> Result<Self, Self::Error> {
        Self::formatted(path, pattern)
    }
}

/// Ordered list of selectors, one per output column
///
/// Cheap to clone: the selectors are shared, so one spec can drive several
/// datasets or concurrent renders.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSpec {
    selectors: Arc<Vec<Selector>>,
    temporal: TemporalFormats,
}

impl ExtractionSpec {
    /// Create empty spec
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec of plain path selectors
    ///
    /// # Errors
    /// Returns error on the first invalid path
    pub fn from_paths<I, S>(paths: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .map(|p| Selector::path(p.as_ref()))
            .collect()
    }

    /// Append a selector
    pub fn push(&mut self, selector: Selector) {
        Arc::make_mut(&mut self.selectors).push(selector);
    }

    /// With an additional selector
    #[inline]
    #[must_use]
    pub fn with(mut self, selector: Selector) -> Self {
        self.push(selector);
        self
    }

    /// With the formats `%s` patterns use for timestamps and dates
    #[must_use]
    pub fn with_temporal_formats(mut self, formats: TemporalFormats) -> Self {
        self.temporal = formats;
        self
    }

    /// Formats `%s` patterns use for timestamps and dates
    #[inline]
    #[must_use]
    pub fn temporal_formats(&self) -> &TemporalFormats {
        &self.temporal
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether there are no selectors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Selectors in column order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }

    /// Extract one row from a record
    ///
    /// # Errors
    /// Returns the first selector error
    pub fn row(&self, record: &Value, index: usize) -> Result<Vec<Cell>, ExtractError> {
        self.selectors
            .iter()
            .map(|selector| selector.select_with(record, index, &self.temporal))
            .collect()
    }
}

impl FromIterator<Selector> for ExtractionSpec {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        Self {
            selectors: Arc::new(iter.into_iter().collect()),
            temporal: TemporalFormats::default(),
        }
    }
}

impl From<Vec<Selector>> for ExtractionSpec {
    fn from(selectors: Vec<Selector>) -> Self {
        Self {
            selectors: Arc::new(selectors),
            temporal: TemporalFormats::default(),
        }
    }
}
