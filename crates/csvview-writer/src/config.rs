//! Format configuration

use crate::encoding::TextEncoding;
use chrono::format::{Item, StrftimeItems};

/// Row terminator used when none is configured
#[cfg(windows)]
pub const DEFAULT_END_OF_LINE: &str = "\r\n";
/// Row terminator used when none is configured
#[cfg(not(windows))]
pub const DEFAULT_END_OF_LINE: &str = "\n";

/// When a field gets wrapped in the enclosure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// Only fields holding the delimiter, the enclosure, CR or LF
    #[default]
    Necessary,
    /// Also fields holding a space or a tab
    ///
    /// Matches spreadsheet-oriented exporters that quote `"Some Space"` and
    /// `"2010-01-05 00:00:00"`.
    Whitespace,
}

/// CSV format configuration
///
/// Built once per render; the writer takes its own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatConfig {
    /// Field separator
    pub delimiter: char,
    /// Quote character; `None` disables quoting and escaping entirely
    pub enclosure: Option<char>,
    /// Appended after every row, including the last
    pub end_of_line: String,
    /// Replacement for line feeds embedded in field text
    pub newline: String,
    /// Text written for null and missing cells
    pub null_representation: String,
    /// Encoding of [`Cell::Bytes`](csvview_record::Cell::Bytes) input
    pub source_encoding: TextEncoding,
    /// Encoding of the produced document
    pub target_encoding: TextEncoding,
    /// Prepend the target encoding's byte-order mark
    pub bom: bool,
    /// Emit a leading `sep=<delimiter>` line
    pub set_separator: bool,
    /// Quoting trigger set
    pub quote_style: QuoteStyle,
    /// strftime pattern for timestamps
    pub datetime_format: String,
    /// strftime pattern for dates
    pub date_format: String,
}

impl FormatConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With field separator
    #[inline]
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// With field separator given as text
    ///
    /// # Errors
    /// Returns error unless the text is exactly one character
    pub fn with_delimiter_str(self, delimiter: &str) -> Result<Self, ConfigurationError> {
        let delimiter = single_char(delimiter, "delimiter")?.ok_or(ConfigurationError::EmptyDelimiter)?;
        Ok(self.with_delimiter(delimiter))
    }

    /// With quote character, or none
    #[inline]
    #[must_use]
    pub fn with_enclosure(mut self, enclosure: Option<char>) -> Self {
        self.enclosure = enclosure;
        self
    }

    /// With quote character given as text; `""` disables quoting
    ///
    /// # Errors
    /// Returns error if the text is longer than one character
    pub fn with_enclosure_str(self, enclosure: &str) -> Result<Self, ConfigurationError> {
        Ok(self.with_enclosure(single_char(enclosure, "enclosure")?))
    }

    /// With row terminator
    #[inline]
    #[must_use]
    pub fn with_end_of_line(mut self, eol: impl Into<String>) -> Self {
        self.end_of_line = eol.into();
        self
    }

    /// With replacement for embedded line feeds
    #[inline]
    #[must_use]
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    /// With null representation
    #[inline]
    #[must_use]
    pub fn with_null(mut self, null: impl Into<String>) -> Self {
        self.null_representation = null.into();
        self
    }

    /// With input encoding for raw byte cells
    #[inline]
    #[must_use]
    pub fn with_source_encoding(mut self, encoding: TextEncoding) -> Self {
        self.source_encoding = encoding;
        self
    }

    /// With output encoding
    #[inline]
    #[must_use]
    pub fn with_target_encoding(mut self, encoding: TextEncoding) -> Self {
        self.target_encoding = encoding;
        self
    }

    /// With byte-order mark
    #[inline]
    #[must_use]
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    /// With leading `sep=` line
    #[inline]
    #[must_use]
    pub fn with_set_separator(mut self, set_separator: bool) -> Self {
        self.set_separator = set_separator;
        self
    }

    /// With quoting trigger set
    #[inline]
    #[must_use]
    pub fn with_quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    /// With timestamp pattern
    #[inline]
    #[must_use]
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    /// With date pattern
    #[inline]
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Whether source and target encodings differ
    #[inline]
    #[must_use]
    pub fn transcodes(&self) -> bool {
        self.source_encoding != self.target_encoding
    }

    /// Check option combinations the writer cannot honour
    ///
    /// # Errors
    /// Returns the first problem found
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if is_line_break(self.delimiter) {
            return Err(ConfigurationError::LineBreakDelimiter);
        }
        if let Some(enclosure) = self.enclosure {
            if enclosure == self.delimiter {
                return Err(ConfigurationError::EnclosureIsDelimiter(enclosure));
            }
            if is_line_break(enclosure) {
                return Err(ConfigurationError::LineBreakEnclosure);
            }
        }
        if self.end_of_line.is_empty() {
            return Err(ConfigurationError::EmptyEndOfLine);
        }
        check_strftime(&self.datetime_format)?;
        check_strftime(&self.date_format)?;
        Ok(())
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            enclosure: Some('"'),
            end_of_line: DEFAULT_END_OF_LINE.to_owned(),
            newline: "\n".to_owned(),
            null_representation: String::new(),
            source_encoding: TextEncoding::utf8(),
            target_encoding: TextEncoding::utf8(),
            bom: false,
            set_separator: false,
            quote_style: QuoteStyle::Necessary,
            datetime_format: "%Y-%m-%d %H:%M:%S".to_owned(),
            date_format: "%Y-%m-%d".to_owned(),
        }
    }
}

fn single_char(text: &str, option: &'static str) -> Result<Option<char>, ConfigurationError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(c)),
        _ => Err(ConfigurationError::NotSingleChar {
            option,
            value: text.to_owned(),
        }),
    }
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn check_strftime(format: &str) -> Result<(), ConfigurationError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigurationError::InvalidTimeFormat(format.to_owned()));
    }
    Ok(())
}

/// Invalid format configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Delimiter and enclosure are the same character
    #[error("enclosure and delimiter are both '{0}'")]
    EnclosureIsDelimiter(char),

    /// Delimiter given as empty text
    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    /// Delimiter is CR or LF
    #[error("delimiter must not be a line break")]
    LineBreakDelimiter,

    /// Enclosure is CR or LF
    #[error("enclosure must not be a line break")]
    LineBreakEnclosure,

    /// Row terminator is empty
    #[error("end of line must not be empty")]
    EmptyEndOfLine,

    /// strftime pattern has an invalid specifier
    #[error("invalid time format: '{0}'")]
    InvalidTimeFormat(String),

    /// Option expects at most one character
    #[error("{option} must be a single character, got '{value}'")]
    NotSingleChar { option: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FormatConfig::default();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.enclosure, Some('"'));
        assert_eq!(config.end_of_line, DEFAULT_END_OF_LINE);
        assert_eq!(config.null_representation, "");
        assert!(!config.bom);
        assert!(!config.transcodes());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn enclosure_from_text() {
        let none = FormatConfig::new().with_enclosure_str("").unwrap();
        assert_eq!(none.enclosure, None);

        let single = FormatConfig::new().with_enclosure_str("'").unwrap();
        assert_eq!(single.enclosure, Some('\''));

        let err = FormatConfig::new().with_enclosure_str("''").unwrap_err();
        assert_eq!(err.to_string(), "enclosure must be a single character, got ''''");
    }

    #[test]
    fn delimiter_from_text() {
        assert_eq!(FormatConfig::new().with_delimiter_str(";").unwrap().delimiter, ';');
        assert_eq!(
            FormatConfig::new().with_delimiter_str("").unwrap_err(),
            ConfigurationError::EmptyDelimiter
        );
        assert!(FormatConfig::new().with_delimiter_str(";;").is_err());
    }

    #[test]
    fn colliding_delimiter_and_enclosure() {
        let config = FormatConfig::new().with_delimiter('"');
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::EnclosureIsDelimiter('"'))
        );

        // No enclosure, no collision
        assert!(config.with_enclosure(None).validate().is_ok());
    }

    #[test]
    fn line_breaks_rejected() {
        assert_eq!(
            FormatConfig::new().with_delimiter('\n').validate(),
            Err(ConfigurationError::LineBreakDelimiter)
        );
        assert_eq!(
            FormatConfig::new().with_enclosure(Some('\r')).validate(),
            Err(ConfigurationError::LineBreakEnclosure)
        );
        assert_eq!(
            FormatConfig::new().with_end_of_line("").validate(),
            Err(ConfigurationError::EmptyEndOfLine)
        );
    }

    #[test]
    fn invalid_time_format_rejected() {
        let config = FormatConfig::new().with_datetime_format("%Y-%Q");
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidTimeFormat(_))
        ));
    }

    #[test]
    fn transcoding_detected() {
        let sjis = TextEncoding::for_label("SJIS").unwrap();
        assert!(FormatConfig::new().with_target_encoding(sjis).transcodes());
    }
}
