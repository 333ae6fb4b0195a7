//! View options
//!
//! The serde form of the view's configuration, read from the same
//! view-variable map that carries the datasets. Option keys start with an
//! underscore; every other key is ignored here.

use crate::error::{CsvViewError, CsvViewResult};
use csvview_extract::{ExtractError, ExtractionSpec, Selector};
use csvview_record::{Cell, FlatRow, Value};
use csvview_writer::{FormatConfig, QuoteStyle, TextEncoding, WriteError};
use serde::Deserialize;

/// Which datasets a render serializes
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "SerializeRepr")]
pub enum Serialize {
    /// Every dataset, in insertion order
    #[default]
    All,
    /// The named datasets, in the given order
    Vars(Vec<String>),
}

impl Serialize {
    /// Serialize a single dataset
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Vars(vec![name.into()])
    }

    /// Serialize the named datasets
    #[must_use]
    pub fn vars<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Vars(names.into_iter().map(Into::into).collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SerializeRepr {
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

impl TryFrom<SerializeRepr> for Serialize {
    type Error = String;

    fn try_from(repr: SerializeRepr) -> Result<Self, Self::Error> {
        match repr {
            SerializeRepr::Flag(true) => Ok(Self::All),
            SerializeRepr::Flag(false) => {
                Err("_serialize is false, but this view only renders datasets".to_owned())
            }
            SerializeRepr::One(name) => Ok(Self::Vars(vec![name])),
            SerializeRepr::Many(names) => Ok(Self::Vars(names)),
        }
    }
}

/// One `_extract` entry: `"User.name"` or `["User.id", "%d"]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExtractOption {
    /// Dotted path
    Path(String),
    /// Dotted path plus printf-style pattern
    Formatted(String, String),
}

impl ExtractOption {
    /// Build the selector
    ///
    /// # Errors
    /// Returns error if the path or pattern is malformed
    pub fn to_selector(&self) -> Result<Selector, ExtractError> {
        match self {
            Self::Path(path) => Selector::path(path),
            Self::Formatted(path, pattern) => Selector::formatted(path, pattern),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum QuoteStyleRepr {
    Necessary,
    Whitespace,
}

fn quote_style<'de, D>(deserializer: D) -> Result<Option<QuoteStyle>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<QuoteStyleRepr>::deserialize(deserializer)?.map(|repr| match repr {
        QuoteStyleRepr::Necessary => QuoteStyle::Necessary,
        QuoteStyleRepr::Whitespace => QuoteStyle::Whitespace,
    }))
}

/// Options recognised in the view-variable map
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ViewOptions {
    #[serde(rename = "_serialize")]
    pub serialize: Option<Serialize>,
    #[serde(rename = "_extract")]
    pub extract: Option<Vec<ExtractOption>>,
    #[serde(rename = "_header")]
    pub header: Option<Vec<serde_json::Value>>,
    #[serde(rename = "_footer")]
    pub footer: Option<Vec<serde_json::Value>>,
    #[serde(rename = "_delimiter")]
    pub delimiter: Option<String>,
    #[serde(rename = "_enclosure")]
    pub enclosure: Option<String>,
    #[serde(rename = "_eol")]
    pub eol: Option<String>,
    #[serde(rename = "_newline")]
    pub newline: Option<String>,
    #[serde(rename = "_null")]
    pub null: Option<String>,
    #[serde(rename = "_bom")]
    pub bom: bool,
    #[serde(rename = "_setSeparator")]
    pub set_separator: bool,
    #[serde(rename = "_csvEncoding")]
    pub csv_encoding: Option<String>,
    #[serde(rename = "_dataEncoding")]
    pub data_encoding: Option<String>,
    #[serde(rename = "_quoteStyle", deserialize_with = "quote_style")]
    pub quote_style: Option<QuoteStyle>,
    #[serde(rename = "_datetimeFormat")]
    pub datetime_format: Option<String>,
    #[serde(rename = "_dateFormat")]
    pub date_format: Option<String>,
}

impl ViewOptions {
    /// Read options from a view-variable map
    ///
    /// # Errors
    /// Returns [`CsvViewError::Options`] if an option has the wrong shape
    pub fn from_view_vars(vars: &serde_json::Value) -> CsvViewResult<Self> {
        Self::deserialize(vars).map_err(|e| CsvViewError::options(e.to_string()))
    }

    /// With quoting trigger set
    #[inline]
    #[must_use]
    pub fn with_quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = Some(style);
        self
    }

    /// Build and validate the format configuration
    ///
    /// # Errors
    /// Returns error on unknown encoding labels or invalid option values
    pub fn format_config(&self) -> CsvViewResult<FormatConfig> {
        let mut config = FormatConfig::new();
        if let Some(delimiter) = &self.delimiter {
            config = config.with_delimiter_str(delimiter).map_err(WriteError::from)?;
        }
        if let Some(enclosure) = &self.enclosure {
            config = config.with_enclosure_str(enclosure).map_err(WriteError::from)?;
        }
        if let Some(eol) = &self.eol {
            config = config.with_end_of_line(eol.as_str());
        }
        if let Some(newline) = &self.newline {
            config = config.with_newline(newline.as_str());
        }
        if let Some(null) = &self.null {
            config = config.with_null(null.as_str());
        }
        if let Some(label) = &self.data_encoding {
            config = config.with_source_encoding(encoding(label)?);
        }
        if let Some(label) = &self.csv_encoding {
            config = config.with_target_encoding(encoding(label)?);
        }
        if let Some(style) = self.quote_style {
            config = config.with_quote_style(style);
        }
        if let Some(format) = &self.datetime_format {
            config = config.with_datetime_format(format.as_str());
        }
        if let Some(format) = &self.date_format {
            config = config.with_date_format(format.as_str());
        }
        config = config.with_bom(self.bom).with_set_separator(self.set_separator);

        config.validate().map_err(WriteError::from)?;
        Ok(config)
    }

    /// Build the extraction spec, if `_extract` was given
    ///
    /// # Errors
    /// Returns error if any entry is malformed
    pub fn extraction_spec(&self) -> CsvViewResult<Option<ExtractionSpec>> {
        let Some(entries) = &self.extract else {
            return Ok(None);
        };
        let spec = entries
            .iter()
            .map(ExtractOption::to_selector)
            .collect::<Result<ExtractionSpec, _>>()?;
        Ok(Some(spec))
    }

    /// Header row, if `_header` was given
    ///
    /// # Errors
    /// Returns [`CsvViewError::Options`] if an entry is not a scalar
    pub fn header_row(&self) -> CsvViewResult<Option<FlatRow>> {
        scalar_row("_header", self.header.as_deref())
    }

    /// Footer row, if `_footer` was given
    ///
    /// # Errors
    /// Returns [`CsvViewError::Options`] if an entry is not a scalar
    pub fn footer_row(&self) -> CsvViewResult<Option<FlatRow>> {
        scalar_row("_footer", self.footer.as_deref())
    }
}

fn encoding(label: &str) -> CsvViewResult<TextEncoding> {
    Ok(TextEncoding::for_label(label).map_err(WriteError::from)?)
}

fn scalar_row(option: &str, entries: Option<&[serde_json::Value]>) -> CsvViewResult<Option<FlatRow>> {
    let Some(entries) = entries else {
        return Ok(None);
    };
    entries
        .iter()
        .map(|entry| {
            Cell::try_from(Value::from(entry.clone()))
                .map_err(|e| CsvViewError::options(format!("{option}: {e}")))
        })
        .collect::<CsvViewResult<FlatRow>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvview_writer::{ConfigurationError, EncodingError};
    use serde_json::json;

    #[test]
    fn empty_map_gives_defaults() {
        let options = ViewOptions::from_view_vars(&json!({})).unwrap();
        assert_eq!(options, ViewOptions::default());
        assert_eq!(options.format_config().unwrap(), FormatConfig::default());
        assert!(options.extraction_spec().unwrap().is_none());
    }

    #[test]
    fn datasets_are_ignored() {
        let vars = json!({ "data": [["a"]], "_eol": "~" });
        let options = ViewOptions::from_view_vars(&vars).unwrap();
        assert_eq!(options.eol.as_deref(), Some("~"));
    }

    #[test]
    fn serialize_forms() {
        let read = |v: serde_json::Value| {
            ViewOptions::from_view_vars(&json!({ "_serialize": v }))
                .map(|o| o.serialize)
        };
        assert_eq!(read(json!("data")).unwrap(), Some(Serialize::var("data")));
        assert_eq!(
            read(json!(["a", "b"])).unwrap(),
            Some(Serialize::vars(["a", "b"]))
        );
        assert_eq!(read(json!(true)).unwrap(), Some(Serialize::All));
        assert!(matches!(read(json!(false)), Err(CsvViewError::Options(_))));
        assert!(read(json!(3)).is_err());
    }

    #[test]
    fn extract_entries() {
        let vars = json!({ "_extract": [["User.id", "%d"], "User.username"] });
        let options = ViewOptions::from_view_vars(&vars).unwrap();
        assert_eq!(
            options.extract,
            Some(vec![
                ExtractOption::Formatted("User.id".into(), "%d".into()),
                ExtractOption::Path("User.username".into()),
            ])
        );
        assert_eq!(options.extraction_spec().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn bad_pattern_is_an_extract_error() {
        let vars = json!({ "_extract": [["User.id", "no conversion"]] });
        let options = ViewOptions::from_view_vars(&vars).unwrap();
        assert!(matches!(
            options.extraction_spec(),
            Err(CsvViewError::Extract(ExtractError::InvalidPattern { .. }))
        ));
    }

    #[test]
    fn format_options_applied() {
        let vars = json!({
            "_delimiter": ";",
            "_enclosure": "",
            "_eol": "\r\n",
            "_null": "NULL",
            "_bom": true,
            "_setSeparator": true,
            "_csvEncoding": "SJIS",
            "_quoteStyle": "whitespace",
            "_dateFormat": "%d/%m/%Y"
        });
        let config = ViewOptions::from_view_vars(&vars).unwrap().format_config().unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.enclosure, None);
        assert_eq!(config.end_of_line, "\r\n");
        assert_eq!(config.null_representation, "NULL");
        assert!(config.bom && config.set_separator);
        assert_eq!(config.target_encoding.name(), "Shift_JIS");
        assert!(config.source_encoding.is_utf8());
        assert_eq!(config.quote_style, QuoteStyle::Whitespace);
        assert_eq!(config.date_format, "%d/%m/%Y");
    }

    #[test]
    fn invalid_format_options_rejected() {
        let bad_label = ViewOptions {
            csv_encoding: Some("klingon".into()),
            ..ViewOptions::default()
        };
        assert!(matches!(
            bad_label.format_config(),
            Err(CsvViewError::Write(WriteError::Encoding(EncodingError::UnknownLabel(_))))
        ));

        let collision = ViewOptions {
            delimiter: Some("'".into()),
            enclosure: Some("'".into()),
            ..ViewOptions::default()
        };
        assert!(matches!(
            collision.format_config(),
            Err(CsvViewError::Write(WriteError::Configuration(
                ConfigurationError::EnclosureIsDelimiter('\'')
            )))
        ));
    }

    #[test]
    fn header_and_footer_rows() {
        let vars = json!({ "_header": ["id", "name", null], "_footer": [["nested"]] });
        let options = ViewOptions::from_view_vars(&vars).unwrap();
        assert_eq!(
            options.header_row().unwrap(),
            Some(vec![Cell::from("id"), Cell::from("name"), Cell::Null])
        );
        let err = options.footer_row().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid view options: _footer: expected a scalar value, got list"
        );
    }
}
