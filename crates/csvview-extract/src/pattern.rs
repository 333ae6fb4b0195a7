//! printf-style cell formatting
//!
//! A [`FormatPattern`] holds exactly one conversion (`%d`, `%05.2f`, `%'*10s`)
//! surrounded by optional literal text. `%%` is a literal percent sign.

use crate::error::ExtractError;
use csvview_record::Cell;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter, Write as _};
use std::str::FromStr;

const DEFAULT_FLOAT_PRECISION: usize = 6;
const DATETIME_TEXT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_TEXT: &str = "%Y-%m-%d";

/// strftime formats `%s` uses for temporal cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFormats {
    /// Format for [`Cell::DateTime`]
    pub datetime: Cow<'static, str>,
    /// Format for [`Cell::Date`]
    pub date: Cow<'static, str>,
}

impl TemporalFormats {
    /// Custom formats
    #[must_use]
    pub fn new(datetime: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            datetime: Cow::Owned(datetime.into()),
            date: Cow::Owned(date.into()),
        }
    }
}

impl Default for TemporalFormats {
    fn default() -> Self {
        Self {
            datetime: Cow::Borrowed(DATETIME_TEXT),
            date: Cow::Borrowed(DATE_TEXT),
        }
    }
}

/// Conversion type letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Decimal,
    Unsigned,
    Float,
    Exponent { upper: bool },
    Text,
    Hex { upper: bool },
    Octal,
    Binary,
    Char,
}

impl Kind {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'd' | 'i' => Self::Decimal,
            'u' => Self::Unsigned,
            'f' | 'F' => Self::Float,
            'e' => Self::Exponent { upper: false },
            'E' => Self::Exponent { upper: true },
            's' => Self::Text,
            'x' => Self::Hex { upper: false },
            'X' => Self::Hex { upper: true },
            'o' => Self::Octal,
            'b' => Self::Binary,
            'c' => Self::Char,
            _ => return None,
        })
    }

    const fn is_numeric(self) -> bool {
        !matches!(self, Self::Text | Self::Char)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Conversion {
    left_align: bool,
    force_sign: bool,
    pad: char,
    width: usize,
    precision: Option<usize>,
    kind: Kind,
}

/// Parsed format pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPattern {
    raw: String,
    prefix: String,
    conversion: Conversion,
    suffix: String,
}

impl FormatPattern {
    /// Parse a pattern
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidPattern`] if the pattern does not hold
    /// exactly one valid conversion
    pub fn parse(pattern: &str) -> Result<Self, ExtractError> {
        let invalid = |reason: &str| ExtractError::invalid_pattern(pattern, reason);

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut conversion = None;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            let literal = if conversion.is_some() { &mut suffix } else { &mut prefix };
            if c != '%' {
                literal.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }
            if conversion.is_some() {
                return Err(invalid("more than one conversion"));
            }

            let mut spec = Conversion {
                left_align: false,
                force_sign: false,
                pad: ' ',
                width: 0,
                precision: None,
                kind: Kind::Text,
            };

            // Flags
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => spec.left_align = true,
                    '+' => spec.force_sign = true,
                    '0' => spec.pad = '0',
                    ' ' => spec.pad = ' ',
                    '\'' => {
                        chars.next();
                        spec.pad = chars.next().ok_or_else(|| invalid("missing padding character"))?;
                        continue;
                    }
                    _ => break,
                }
                chars.next();
            }

            spec.width = take_number(&mut chars).unwrap_or(0);
            if chars.peek() == Some(&'.') {
                chars.next();
                spec.precision = Some(take_number(&mut chars).unwrap_or(0));
            }

            let letter = chars.next().ok_or_else(|| invalid("missing conversion type"))?;
            spec.kind = Kind::from_char(letter)
                .ok_or_else(|| invalid(&format!("unknown conversion type '{letter}'")))?;
            conversion = Some(spec);
        }

        let conversion = conversion.ok_or_else(|| invalid("no conversion"))?;
        Ok(Self {
            raw: pattern.to_owned(),
            prefix,
            conversion,
            suffix,
        })
    }

    /// Original pattern text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Format a resolved cell
    ///
    /// Returns `None` for missing or null cells so the caller can emit an
    /// empty value instead of formatting zero. Returns `Some(Err(..))` for
    /// undecoded bytes under a text conversion, whose characters cannot be
    /// known without the source encoding.
    #[must_use]
    pub fn apply(&self, cell: &Cell) -> Option<Result<String, String>> {
        self.apply_with(cell, &TemporalFormats::default())
    }

    /// Format a resolved cell, rendering temporal cells under `%s` with
    /// `formats`
    #[must_use]
    pub fn apply_with(
        &self,
        cell: &Cell,
        formats: &TemporalFormats,
    ) -> Option<Result<String, String>> {
        if cell.is_nullish() {
            return None;
        }
        Some(self.render(cell, formats).map(|body| {
            let mut out = String::with_capacity(self.prefix.len() + body.len() + self.suffix.len());
            out.push_str(&self.prefix);
            out.push_str(&body);
            out.push_str(&self.suffix);
            out
        }))
    }

    fn render(&self, cell: &Cell, formats: &TemporalFormats) -> Result<String, String> {
        let spec = &self.conversion;
        let (sign, digits) = match spec.kind {
            Kind::Decimal => {
                let i = integer_of(cell);
                let sign = if i < 0 {
                    "-"
                } else if spec.force_sign {
                    "+"
                } else {
                    ""
                };
                (sign, i.unsigned_abs().to_string())
            }
            Kind::Float | Kind::Exponent { .. } => {
                let f = float_of(cell);
                let precision = spec.precision.unwrap_or(DEFAULT_FLOAT_PRECISION);
                let sign = if f.is_sign_negative() && f != 0.0 {
                    "-"
                } else if spec.force_sign {
                    "+"
                } else {
                    ""
                };
                let body = match spec.kind {
                    Kind::Exponent { upper } => exponent_text(f.abs(), precision, upper),
                    _ => format!("{:.*}", precision, f.abs()),
                };
                (sign, body)
            }
            // Negative values print their two's complement, as C printf does
            #[allow(clippy::cast_sign_loss)]
            Kind::Unsigned => ("", (integer_of(cell) as u64).to_string()),
            #[allow(clippy::cast_sign_loss)]
            Kind::Hex { upper: false } => ("", format!("{:x}", integer_of(cell) as u64)),
            #[allow(clippy::cast_sign_loss)]
            Kind::Hex { upper: true } => ("", format!("{:X}", integer_of(cell) as u64)),
            #[allow(clippy::cast_sign_loss)]
            Kind::Octal => ("", format!("{:o}", integer_of(cell) as u64)),
            #[allow(clippy::cast_sign_loss)]
            Kind::Binary => ("", format!("{:b}", integer_of(cell) as u64)),
            Kind::Char => {
                let code = u32::try_from(integer_of(cell)).unwrap_or(0);
                return Ok(char::from_u32(code).map(String::from).unwrap_or_default());
            }
            Kind::Text => {
                let text = text_of(cell, formats)?;
                let text = match spec.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                };
                ("", text)
            }
        };

        Ok(pad(spec, sign, &digits))
    }
}

fn pad(spec: &Conversion, sign: &str, body: &str) -> String {
    let len = sign.chars().count() + body.chars().count();
    if len >= spec.width {
        return format!("{sign}{body}");
    }
    let fill = spec.width - len;

    if spec.left_align {
        // Trailing zeros would change a number
        let pad = if spec.pad == '0' && spec.kind.is_numeric() { ' ' } else { spec.pad };
        format!("{sign}{body}{}", pad.to_string().repeat(fill))
    } else if spec.pad == '0' && spec.kind.is_numeric() {
        format!("{sign}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{body}", spec.pad.to_string().repeat(fill))
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut n: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        n = Some(n.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
    }
    n
}

/// `1.234500e+3` style exponent
fn exponent_text(f: f64, precision: usize, upper: bool) -> String {
    let text = format!("{f:.precision$e}");
    let text = match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    };
    if upper {
        text.to_uppercase()
    } else {
        text
    }
}

/// Leading numeric prefix of text, as loosely typed sources coerce it
fn numeric_prefix(text: &str) -> &str {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if seen_digit {
        &text[..end]
    } else {
        ""
    }
}

fn float_of(cell: &Cell) -> f64 {
    match cell {
        Cell::Bool(b) => f64::from(u8::from(*b)),
        #[allow(clippy::cast_precision_loss)]
        Cell::Int(i) => *i as f64,
        Cell::Float(f) => *f,
        Cell::Text(s) => numeric_prefix(s).parse().unwrap_or(0.0),
        Cell::Bytes(b) => std::str::from_utf8(b)
            .ok()
            .and_then(|s| numeric_prefix(s).parse().ok())
            .unwrap_or(0.0),
        #[allow(clippy::cast_precision_loss)]
        Cell::DateTime(dt) => dt.and_utc().timestamp() as f64,
        #[allow(clippy::cast_precision_loss)]
        Cell::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map_or(0.0, |dt| dt.and_utc().timestamp() as f64),
        Cell::Missing | Cell::Null => 0.0,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integer_of(cell: &Cell) -> i64 {
    match cell {
        Cell::Int(i) => *i,
        Cell::Bool(b) => i64::from(*b),
        Cell::DateTime(dt) => dt.and_utc().timestamp(),
        // `as` saturates and maps NaN to zero
        _ => float_of(cell).trunc() as i64,
    }
}

fn text_of(cell: &Cell, formats: &TemporalFormats) -> Result<String, String> {
    Ok(match cell {
        Cell::Missing | Cell::Null => String::new(),
        Cell::Bool(b) => if *b { "1" } else { "0" }.to_owned(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Text(s) => s.clone(),
        Cell::Bytes(_) => {
            return Err("text conversion needs decoded text, got raw bytes".to_owned());
        }
        Cell::DateTime(dt) => strftime(dt.format(&formats.datetime), &formats.datetime)?,
        Cell::Date(d) => strftime(d.format(&formats.date), &formats.date)?,
    })
}

/// Invalid strftime items fail the write instead of panicking
fn strftime(item: impl Display, format: &str) -> Result<String, String> {
    let mut text = String::new();
    write!(text, "{item}").map_err(|_| format!("invalid date format '{format}'"))?;
    Ok(text)
}

impl FromStr for FormatPattern {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for FormatPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(pattern: &str, cell: impl Into<Cell>) -> String {
        FormatPattern::parse(pattern)
            .unwrap()
            .apply(&cell.into())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn integer_conversion() {
        assert_eq!(fmt("%d", 1), "1");
        assert_eq!(fmt("%d", "42abc"), "42");
        assert_eq!(fmt("%d", 3.99), "3");
        assert_eq!(fmt("%d", "nope"), "0");
        assert_eq!(fmt("%d", true), "1");
    }

    #[test]
    fn width_and_padding() {
        assert_eq!(fmt("%05d", 42), "00042");
        assert_eq!(fmt("%05d", -42), "-0042");
        assert_eq!(fmt("%5d", 42), "   42");
        assert_eq!(fmt("%-5d|", 42), "42   |");
        assert_eq!(fmt("%+d", 42), "+42");
        assert_eq!(fmt("%'*8s", "abc"), "*****abc");
        assert_eq!(fmt("%-6s|", "ab"), "ab    |");
    }

    #[test]
    fn float_conversion() {
        assert_eq!(fmt("%.2f", 3.14159), "3.14");
        assert_eq!(fmt("%f", 1), "1.000000");
        assert_eq!(fmt("%08.3f", -1.5), "-001.500");
        assert_eq!(fmt("%.1f", "2.26 EUR"), "2.3");
    }

    #[test]
    fn exponent_conversion() {
        assert_eq!(fmt("%e", 1234.5), "1.234500e+3");
        assert_eq!(fmt("%.2E", 0.012), "1.20E-2");
    }

    #[test]
    fn radix_conversions() {
        assert_eq!(fmt("%x", 255), "ff");
        assert_eq!(fmt("%X", 255), "FF");
        assert_eq!(fmt("%o", 8), "10");
        assert_eq!(fmt("%b", 5), "101");
        assert_eq!(fmt("%08b", 5), "00000101");
        assert_eq!(fmt("%u", -1), u64::MAX.to_string());
    }

    #[test]
    fn text_and_char_conversion() {
        assert_eq!(fmt("%.3s", "abcdef"), "abc");
        assert_eq!(fmt("%c", 65), "A");
        assert_eq!(fmt("%s", 2.5), "2.5");
    }

    #[test]
    fn literal_text_and_percent() {
        assert_eq!(fmt("#%d", 7), "#7");
        assert_eq!(fmt("%d%%", 50), "50%");
        assert_eq!(fmt("%% of %s", "total"), "% of total");
    }

    #[test]
    fn temporal_values() {
        let dt = chrono::NaiveDate::from_ymd_opt(2010, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(fmt("%s", Cell::DateTime(dt)), "2010-01-05 00:00:00");
        assert_eq!(fmt("%d", Cell::DateTime(dt)), "1262649600");
    }

    #[test]
    fn text_conversion_uses_given_temporal_formats() {
        let date = chrono::NaiveDate::from_ymd_opt(2010, 1, 5).unwrap();
        let dt = date.and_hms_opt(10, 39, 23).unwrap();
        let pattern = FormatPattern::parse("[%s]").unwrap();
        let formats = TemporalFormats::new("%d/%m/%Y %H:%M", "%d/%m/%Y");

        assert_eq!(
            pattern.apply_with(&Cell::DateTime(dt), &formats),
            Some(Ok("[05/01/2010 10:39]".into()))
        );
        assert_eq!(
            pattern.apply_with(&Cell::Date(date), &formats),
            Some(Ok("[05/01/2010]".into()))
        );
        // Numeric conversions ignore the formats
        let numeric = FormatPattern::parse("%d").unwrap();
        assert_eq!(
            numeric.apply_with(&Cell::Date(date), &formats),
            Some(Ok("1262649600".into()))
        );
    }

    #[test]
    fn invalid_temporal_format_fails_without_panicking() {
        let dt = chrono::NaiveDate::from_ymd_opt(2010, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let pattern = FormatPattern::parse("%s").unwrap();
        let formats = TemporalFormats::new("%Q", "%Y");
        let result = pattern.apply_with(&Cell::DateTime(dt), &formats).unwrap();
        assert_eq!(result, Err("invalid date format '%Q'".to_owned()));
    }

    #[test]
    fn nullish_cells_are_not_formatted() {
        let pattern = FormatPattern::parse("%d").unwrap();
        assert_eq!(pattern.apply(&Cell::Null), None);
        assert_eq!(pattern.apply(&Cell::Missing), None);
    }

    #[test]
    fn bytes_under_text_conversion_fail() {
        let pattern = FormatPattern::parse("%s").unwrap();
        let result = pattern.apply(&Cell::Bytes(b"abc".to_vec())).unwrap();
        assert!(result.is_err());

        let numeric = FormatPattern::parse("%d").unwrap();
        assert_eq!(numeric.apply(&Cell::Bytes(b"12".to_vec())), Some(Ok("12".into())));
    }

    #[test]
    fn invalid_patterns() {
        for bad in ["", "plain", "%", "%q", "%d-%d", "%'"] {
            let err = FormatPattern::parse(bad).unwrap_err();
            assert!(
                matches!(err, ExtractError::InvalidPattern { .. }),
                "pattern {bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn display_is_raw_pattern() {
        let pattern: FormatPattern = "%05.1f".parse().unwrap();
        assert_eq!(pattern.to_string(), "%05.1f");
        assert_eq!(pattern.as_str(), "%05.1f");
    }
}
