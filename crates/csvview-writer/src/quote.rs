//! Cell text conversion and field quoting

use crate::config::{FormatConfig, QuoteStyle};
use crate::encoding::EncodingError;
use csvview_record::Cell;
use std::borrow::Cow;

/// Text form of a cell
///
/// Null and missing cells become the null representation. Raw bytes are
/// decoded from the source encoding.
///
/// # Errors
/// Returns error if raw bytes are not valid in the source encoding
pub fn cell_text<'a>(cell: &'a Cell, config: &'a FormatConfig) -> Result<Cow<'a, str>, EncodingError> {
    Ok(match cell {
        Cell::Missing | Cell::Null => Cow::Borrowed(config.null_representation.as_str()),
        Cell::Bool(true) => Cow::Borrowed("1"),
        Cell::Bool(false) => Cow::Borrowed("0"),
        Cell::Int(i) => Cow::Owned(i.to_string()),
        Cell::Float(f) => Cow::Owned(f.to_string()),
        Cell::Text(s) => Cow::Borrowed(s.as_str()),
        Cell::Bytes(bytes) => config.source_encoding.decode(bytes)?,
        Cell::DateTime(dt) => Cow::Owned(dt.format(&config.datetime_format).to_string()),
        Cell::Date(d) => Cow::Owned(d.format(&config.date_format).to_string()),
    })
}

/// Quote and escape one field
///
/// Embedded line feeds are replaced by `config.newline` first. Without an
/// enclosure the text is returned untouched.
#[must_use]
pub fn quote_field<'a>(text: &'a str, config: &FormatConfig) -> Cow<'a, str> {
    let text: Cow<'a, str> = if config.newline != "\n" && text.contains('\n') {
        Cow::Owned(text.replace('\n', &config.newline))
    } else {
        Cow::Borrowed(text)
    };

    let Some(enclosure) = config.enclosure else {
        return text;
    };
    if !needs_quotes(&text, config.delimiter, enclosure, config.quote_style) {
        return text;
    }

    let mut out = String::with_capacity(text.len() + 2);
    out.push(enclosure);
    for c in text.chars() {
        if c == enclosure {
            out.push(enclosure);
        }
        out.push(c);
    }
    out.push(enclosure);
    Cow::Owned(out)
}

fn needs_quotes(text: &str, delimiter: char, enclosure: char, style: QuoteStyle) -> bool {
    text.chars().any(|c| {
        c == delimiter
            || c == enclosure
            || c == '\n'
            || c == '\r'
            || (style == QuoteStyle::Whitespace && (c == ' ' || c == '\t'))
    })
}
