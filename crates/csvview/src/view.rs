//! The CSV view
//!
//! Holds named datasets plus rendering options and turns the selected
//! datasets into one CSV document.

use crate::error::{CsvViewError, CsvViewResult};
use crate::options::{Serialize, ViewOptions};
use csvview_extract::{extract, ExtractionSpec, Rows, TemporalFormats};
use csvview_record::{Cell, FlatRow, Value};
use csvview_writer::{FormatConfig, RowEncoder, WriteError, CONTENT_TYPE};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;

/// Boxed record source
pub type Records<'a> = Box<dyn Iterator<Item = Value> + 'a>;

/// A named view variable
pub enum Dataset<'a> {
    /// Record sequence, pulled lazily during the render
    Records(Records<'a>),
    /// Single value; cannot be serialized
    Value(Value),
}

impl<'a> Dataset<'a> {
    /// Wrap a lazy record source such as a database cursor
    pub fn records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'a,
    {
        Self::Records(Box::new(records.into_iter()))
    }

    /// Check if the dataset can be serialized
    #[inline]
    #[must_use]
    pub fn is_iterable(&self) -> bool {
        matches!(self, Self::Records(_))
    }
}

impl fmt::Debug for Dataset<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Records(_) => f.write_str("Records(<iter>)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<Value> for Dataset<'_> {
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Self::Records(Box::new(items.into_iter())),
            other => Self::Value(other),
        }
    }
}

impl From<Vec<Value>> for Dataset<'_> {
    fn from(records: Vec<Value>) -> Self {
        Self::Records(Box::new(records.into_iter()))
    }
}

impl From<serde_json::Value> for Dataset<'_> {
    fn from(value: serde_json::Value) -> Self {
        Value::from(value).into()
    }
}

impl FromIterator<Value> for Dataset<'_> {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

/// A fully rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCsv {
    /// Encoded document bytes
    pub body: Vec<u8>,
    /// Always [`CONTENT_TYPE`]
    pub content_type: &'static str,
    /// Name of the target encoding
    pub charset: &'static str,
}

impl RenderedCsv {
    /// Value for a `Content-Type` header
    #[must_use]
    pub fn content_type_header(&self) -> String {
        format!("{}; charset={}", self.content_type, self.charset)
    }

    /// Body as text, when the document is UTF-8
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// CSV export view
///
/// # Example
///
/// ```rust
/// use csvview::{CsvView, Serialize};
/// use csvview_record::Value;
///
/// let rendered = CsvView::new()
///     .set("data", Value::list([Value::list(["a", "b"]), Value::list([1, 2])]))
///     .serialize(Serialize::var("data"))
///     .render()
///     .unwrap();
///
/// assert_eq!(rendered.content_type, "text/csv");
/// assert_eq!(rendered.text().unwrap().lines().collect::<Vec<_>>(), ["a,b", "1,2"]);
/// ```
#[derive(Debug, Default)]
pub struct CsvView<'a> {
    datasets: IndexMap<String, Dataset<'a>>,
    serialize: Serialize,
    spec: Option<ExtractionSpec>,
    header: Option<FlatRow>,
    footer: Option<FlatRow>,
    config: FormatConfig,
}

impl<'a> CsvView<'a> {
    /// Create empty view with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a view from a view-variable map
    ///
    /// Keys starting with `_` are read as [`ViewOptions`]; every other key
    /// becomes a dataset.
    ///
    /// # Errors
    /// Returns error if `vars` is not an object or an option is invalid
    pub fn from_view_vars(vars: serde_json::Value) -> CsvViewResult<Self> {
        let options = ViewOptions::from_view_vars(&vars)?;
        let serde_json::Value::Object(entries) = vars else {
            return Err(CsvViewError::options("view variables must be an object"));
        };
        let view = entries
            .into_iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .fold(Self::new(), |view, (name, value)| view.set(name, value));
        view.options(options)
    }

    /// Set a dataset, replacing any previous one with the same name
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, dataset: impl Into<Dataset<'a>>) -> Self {
        self.datasets.insert(name.into(), dataset.into());
        self
    }

    /// Choose the datasets to serialize
    #[must_use]
    pub fn serialize(mut self, serialize: Serialize) -> Self {
        self.serialize = serialize;
        self
    }

    /// Apply an extraction spec to every serialized dataset
    #[must_use]
    pub fn extract(mut self, spec: ExtractionSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Row written before the first dataset
    #[must_use]
    pub fn header<R: Into<FlatRow>>(mut self, row: R) -> Self {
        self.header = Some(row.into());
        self
    }

    /// Row written after the last dataset
    #[must_use]
    pub fn footer<R: Into<FlatRow>>(mut self, row: R) -> Self {
        self.footer = Some(row.into());
        self
    }

    /// Replace the format configuration
    #[must_use]
    pub fn with_config(mut self, config: FormatConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply view options
    ///
    /// Replaces the format configuration; `_serialize`, `_extract`,
    /// `_header` and `_footer` override earlier settings only when present.
    ///
    /// # Errors
    /// Returns error if an option is invalid
    pub fn options(mut self, options: ViewOptions) -> CsvViewResult<Self> {
        self.config = options.format_config()?;
        if let Some(spec) = options.extraction_spec()? {
            self.spec = Some(spec);
        }
        if let Some(header) = options.header_row()? {
            self.header = Some(header);
        }
        if let Some(footer) = options.footer_row()? {
            self.footer = Some(footer);
        }
        if let Some(serialize) = options.serialize {
            self.serialize = serialize;
        }
        Ok(self)
    }

    /// Format configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Render the whole document into memory
    ///
    /// Nothing is returned unless every row succeeded.
    ///
    /// # Errors
    /// Returns the first setup, extraction or encoding error
    pub fn render(self) -> CsvViewResult<RenderedCsv> {
        let charset = self.config.target_encoding.name();
        let mut body = Vec::new();
        for chunk in self.stream()? {
            body.extend_from_slice(&chunk?);
        }
        Ok(RenderedCsv {
            body,
            content_type: CONTENT_TYPE,
            charset,
        })
    }

    /// Render into a caller-owned writer
    ///
    /// Chunks already written when an error occurs stay in `writer`.
    ///
    /// # Errors
    /// Returns the first setup, extraction, encoding or io error
    pub fn render_to<W: Write>(self, mut writer: W) -> CsvViewResult<W> {
        for chunk in self.stream()? {
            writer.write_all(&chunk?).map_err(WriteError::from)?;
        }
        writer.flush().map_err(WriteError::from)?;
        Ok(writer)
    }

    /// Render lazily, one encoded chunk at a time
    ///
    /// Dataset selection and configuration are checked here, before any
    /// record is pulled.
    ///
    /// # Errors
    /// Returns error on invalid configuration, unknown or non-iterable datasets
    pub fn stream(self) -> CsvViewResult<RenderStream<'a>> {
        let Self {
            mut datasets,
            serialize,
            spec,
            header,
            footer,
            config,
        } = self;
        let encoder = RowEncoder::new(config)?;
        // Formatted `%s` columns render timestamps like plain path columns
        let spec = spec.map(|spec| {
            let config = encoder.config();
            spec.with_temporal_formats(TemporalFormats::new(
                config.datetime_format.as_str(),
                config.date_format.as_str(),
            ))
        });

        let names: Vec<String> = match serialize {
            Serialize::All => datasets.keys().cloned().collect(),
            Serialize::Vars(names) => names,
        };
        let mut pending = VecDeque::with_capacity(names.len());
        for name in names {
            match datasets.swap_remove(&name) {
                Some(Dataset::Records(records)) => pending.push_back((name, records)),
                Some(Dataset::Value(_)) => return Err(CsvViewError::NotIterable(name)),
                None if pending.iter().any(|(n, _)| *n == name) => {
                    return Err(CsvViewError::options(format!(
                        "dataset '{name}' is serialized more than once"
                    )))
                }
                None => return Err(CsvViewError::UnknownDataset(name)),
            }
        }

        tracing::debug!(
            "Rendering {} dataset(s) with {} selector(s), {} -> {}",
            pending.len(),
            spec.as_ref().map_or(0, ExtractionSpec::len),
            encoder.config().source_encoding,
            encoder.config().target_encoding
        );

        Ok(RenderStream {
            encoder,
            spec,
            header,
            footer,
            pending,
            current: None,
            phase: Phase::Preamble,
            rows_written: 0,
            bytes_written: 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Preamble,
    Header,
    Body,
    Footer,
    Done,
    Failed,
}

/// Lazy render output
///
/// Yields the preamble, the header, one chunk per row and the footer.
/// Records are pulled only as chunks are requested; dropping the stream
/// stops the render. After an error the stream yields nothing more.
pub struct RenderStream<'a> {
    encoder: RowEncoder,
    spec: Option<ExtractionSpec>,
    header: Option<FlatRow>,
    footer: Option<FlatRow>,
    pending: VecDeque<(String, Records<'a>)>,
    current: Option<Rows<Records<'a>>>,
    phase: Phase,
    rows_written: usize,
    bytes_written: u64,
}

impl RenderStream<'_> {
    /// Rows encoded so far, header and footer included
    #[inline]
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Bytes produced so far
    #[inline]
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn encode(&mut self, row: &[Cell]) -> CsvViewResult<Vec<u8>> {
        match self.encoder.encode_row(row, self.rows_written) {
            Ok(bytes) => {
                self.rows_written += 1;
                self.bytes_written += bytes.len() as u64;
                Ok(bytes)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn fail(&mut self, error: CsvViewError) -> CsvViewError {
        tracing::warn!("CSV render aborted after {} rows: {}", self.rows_written, error);
        self.phase = Phase::Failed;
        error
    }
}

impl Iterator for RenderStream<'_> {
    type Item = CsvViewResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::Preamble => {
                    self.phase = Phase::Header;
                    match self.encoder.preamble() {
                        Ok(bytes) if bytes.is_empty() => {}
                        Ok(bytes) => {
                            self.bytes_written += bytes.len() as u64;
                            return Some(Ok(bytes));
                        }
                        Err(e) => return Some(Err(self.fail(e.into()))),
                    }
                }
                Phase::Header => {
                    self.phase = Phase::Body;
                    if let Some(header) = self.header.take() {
                        return Some(self.encode(&header));
                    }
                }
                Phase::Body => {
                    if let Some(rows) = self.current.as_mut() {
                        match rows.next() {
                            Some(Ok(row)) => return Some(self.encode(&row)),
                            Some(Err(e)) => return Some(Err(self.fail(e.into()))),
                            None => self.current = None,
                        }
                    } else if let Some((name, records)) = self.pending.pop_front() {
                        tracing::debug!("Serializing dataset '{}'", name);
                        self.current = Some(extract(records, self.spec.as_ref()));
                    } else {
                        self.phase = Phase::Footer;
                    }
                }
                Phase::Footer => {
                    self.phase = Phase::Done;
                    if let Some(footer) = self.footer.take() {
                        return Some(self.encode(&footer));
                    }
                }
                Phase::Done => {
                    tracing::info!(
                        "CSV render completed: {} rows, {} bytes",
                        self.rows_written,
                        self.bytes_written
                    );
                    self.phase = Phase::Failed;
                    return None;
                }
                Phase::Failed => return None,
            }
        }
    }
}

impl std::iter::FusedIterator for RenderStream<'_> {}
