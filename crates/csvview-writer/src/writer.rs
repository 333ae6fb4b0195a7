//! Row assembly and streaming output

use crate::config::FormatConfig;
use crate::encoding::EncodingError;
use crate::error::WriteError;
use crate::quote::{cell_text, quote_field};
use csvview_record::Cell;
use std::io::Write;

/// Pure row encoder: cells in, encoded bytes out
///
/// Holds a validated [`FormatConfig`]. Keeps no per-document state, so the
/// caller decides where the preamble goes.
#[derive(Debug, Clone)]
pub struct RowEncoder {
    config: FormatConfig,
}

impl RowEncoder {
    /// Create encoder from configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(config: FormatConfig) -> Result<Self, WriteError> {
        config.validate()?;
        if config.bom && config.target_encoding.bom().is_empty() {
            tracing::debug!(
                "No byte-order mark exists for {}, none will be written",
                config.target_encoding
            );
        }
        Ok(Self { config })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Bytes that precede the first row: BOM, then the `sep=` line
    ///
    /// # Errors
    /// Returns error if the separator line cannot be encoded
    pub fn preamble(&self) -> Result<Vec<u8>, WriteError> {
        let mut out = Vec::new();
        if self.config.bom {
            out.extend_from_slice(self.config.target_encoding.bom());
        }
        if self.config.set_separator {
            let line = format!("sep={}{}", self.config.delimiter, self.config.end_of_line);
            out.extend_from_slice(&self.config.target_encoding.encode(&line)?);
        }
        Ok(out)
    }

    /// Assembled row text, before output encoding
    ///
    /// # Errors
    /// Returns error if a byte cell is not valid in the source encoding
    pub fn row_text(&self, row: &[Cell]) -> Result<String, EncodingError> {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push(self.config.delimiter);
            }
            let text = cell_text(cell, &self.config)?;
            line.push_str(&quote_field(&text, &self.config));
        }
        line.push_str(&self.config.end_of_line);
        Ok(line)
    }

    /// Encode one row
    ///
    /// `index` is only used to label errors.
    ///
    /// # Errors
    /// Returns [`WriteError::Row`] on decoding or encoding failure
    pub fn encode_row(&self, row: &[Cell], index: usize) -> Result<Vec<u8>, WriteError> {
        let line = self.row_text(row).map_err(|e| WriteError::row(index, e))?;
        if self.config.target_encoding.is_utf8() {
            return Ok(line.into_bytes());
        }
        self.config
            .target_encoding
            .encode(&line)
            .map(std::borrow::Cow::into_owned)
            .map_err(|e| WriteError::row(index, e))
    }
}

/// Streaming CSV writer over any [`Write`] sink
///
/// Rows are encoded and written one at a time. Bytes already handed to the
/// sink stay there if a later row fails.
#[derive(Debug)]
pub struct CsvWriter<W> {
    inner: W,
    encoder: RowEncoder,
    started: bool,
    rows_written: usize,
    bytes_written: u64,
}

impl<W: Write> CsvWriter<W> {
    /// Create writer from configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(inner: W, config: FormatConfig) -> Result<Self, WriteError> {
        Ok(Self::from_encoder(inner, RowEncoder::new(config)?))
    }

    /// Create writer from an existing encoder
    #[must_use]
    pub fn from_encoder(inner: W, encoder: RowEncoder) -> Self {
        Self {
            inner,
            encoder,
            started: false,
            rows_written: 0,
            bytes_written: 0,
        }
    }

    /// Write the preamble unless already written
    ///
    /// # Errors
    /// Returns error on encoding or io failure
    pub fn write_preamble(&mut self) -> Result<(), WriteError> {
        if !self.started {
            self.started = true;
            let preamble = self.encoder.preamble()?;
            self.emit(&preamble)?;
        }
        Ok(())
    }

    /// Write one row
    ///
    /// # Errors
    /// Returns error on encoding or io failure
    pub fn write_row<R: AsRef<[Cell]>>(&mut self, row: R) -> Result<(), WriteError> {
        self.write_preamble()?;
        let bytes = self.encoder.encode_row(row.as_ref(), self.rows_written)?;
        self.emit(&bytes)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Write every row in order
    ///
    /// # Errors
    /// Returns the first failure; earlier rows stay written
    pub fn write_rows<I, R>(&mut self, rows: I) -> Result<(), WriteError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[Cell]>,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Rows written so far
    #[inline]
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Bytes written so far, preamble included
    #[inline]
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Borrow the underlying sink
    #[inline]
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Write the preamble if nothing was written, flush, return the sink
    ///
    /// # Errors
    /// Returns error on encoding or io failure
    pub fn finish(mut self) -> Result<W, WriteError> {
        self.write_preamble()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        self.inner.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

/// Serialize rows into one buffered document
///
/// # Errors
/// Returns error on invalid configuration or encoding failure
pub fn serialize<I, R>(rows: I, config: &FormatConfig) -> Result<Vec<u8>, WriteError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[Cell]>,
{
    let mut writer = CsvWriter::new(Vec::new(), config.clone())?;
    writer.write_rows(rows)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuoteStyle;
    use crate::encoding::{EncodingError, TextEncoding};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn unix() -> FormatConfig {
        FormatConfig::new().with_end_of_line("\n")
    }

    fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
        rows.iter()
            .map(|row| row.iter().map(|s| Cell::from(*s)).collect())
            .collect()
    }

    fn render(rows: Vec<Vec<Cell>>, config: &FormatConfig) -> String {
        String::from_utf8(serialize(rows, config).unwrap()).unwrap()
    }

    #[test]
    fn single_row_default_config() {
        let rows = text_rows(&[&["user", "fake", "list", "item1", "item2"]]);
        assert_eq!(render(rows, &unix()), "user,fake,list,item1,item2\n");
    }

    #[test]
    fn default_eol_is_platform_newline() {
        let rows = text_rows(&[&["a"]]);
        assert_eq!(
            render(rows, &FormatConfig::default()),
            format!("a{}", crate::config::DEFAULT_END_OF_LINE)
        );
    }

    #[test]
    fn mixed_scalars_and_custom_eol() {
        let rows = vec![
            vec![Cell::from("a"), Cell::from("b"), Cell::from("c")],
            vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)],
            vec![Cell::from("you"), Cell::from("and"), Cell::from("me")],
        ];
        let config = FormatConfig::new().with_end_of_line("~");
        assert_eq!(render(rows, &config), "a,b,c~1,2,3~you,and,me~");
    }

    #[test]
    fn custom_null_token() {
        let rows = vec![
            vec![Cell::Int(1), Cell::Int(2), Cell::Null],
            vec![Cell::from("you"), Cell::Missing, Cell::from("me")],
        ];
        let config = FormatConfig::new().with_null("NULL").with_end_of_line("~");
        assert_eq!(render(rows, &config), "1,2,NULL~you,NULL,me~");
    }

    #[test]
    fn null_token_that_needs_quotes_is_quoted() {
        let rows = vec![vec![Cell::Null, Cell::from("x")]];
        let config = unix().with_null("n/a, none");
        assert_eq!(render(rows, &config), "\"n/a, none\",x\n");
    }

    #[test]
    fn enclosure_variants() {
        let rows = || text_rows(&[&["user", "fake apple", "list", "a b c", "item2"]]);
        let spaced = unix().with_quote_style(QuoteStyle::Whitespace);

        assert_eq!(
            render(rows(), &spaced),
            "user,\"fake apple\",list,\"a b c\",item2\n"
        );
        assert_eq!(
            render(rows(), &spaced.clone().with_enclosure(Some('\''))),
            "user,'fake apple',list,'a b c',item2\n"
        );
        assert_eq!(
            render(rows(), &spaced.with_enclosure(None)),
            "user,fake apple,list,a b c,item2\n"
        );
    }

    #[test]
    fn special_characters() {
        let rows = text_rows(&[
            &["José", "", "ñáé"],
            &["Including,Comma", "Containing\"char", "Containing'char"],
            &["Some Space", "A\nNewline", "A\tTab"],
        ]);
        assert_eq!(
            render(rows.clone(), &unix()),
            "José,,ñáé\n\
             \"Including,Comma\",\"Containing\"\"char\",Containing'char\n\
             Some Space,\"A\nNewline\",A\tTab\n"
        );
        assert_eq!(
            render(rows, &unix().with_quote_style(QuoteStyle::Whitespace)),
            "José,,ñáé\n\
             \"Including,Comma\",\"Containing\"\"char\",Containing'char\n\
             \"Some Space\",\"A\nNewline\",\"A\tTab\"\n"
        );
    }

    #[test]
    fn semicolon_delimiter() {
        let rows = text_rows(&[&["a;b", "c,d"]]);
        let config = unix().with_delimiter(';');
        assert_eq!(render(rows, &config), "\"a;b\";c,d\n");
    }

    #[test]
    fn transcodes_to_shift_jis() {
        let sjis = TextEncoding::for_label("SJIS").unwrap();
        let rows = text_rows(&[&["a", "b"], &["日本", "語"]]);
        let out = serialize(rows, &unix().with_target_encoding(sjis)).unwrap();
        assert_eq!(out, b"a,b\n\x93\xfa\x96\x7b,\x8c\xea\n".to_vec());
    }

    #[test]
    fn unmappable_character_aborts_with_row_index() {
        let latin1 = TextEncoding::for_label("windows-1252").unwrap();
        let rows = text_rows(&[&["fine"], &["also fine é"], &["日"]]);
        let err = serialize(rows, &unix().with_target_encoding(latin1)).unwrap_err();
        assert!(matches!(
            err,
            WriteError::Row {
                row: 2,
                source: EncodingError::Unmappable { character: '日', .. }
            }
        ));
    }

    #[test]
    fn byte_cells_transcode_between_encodings() {
        let sjis = TextEncoding::for_label("SJIS").unwrap();
        let config = unix().with_source_encoding(sjis);
        assert!(config.transcodes());
        let rows = vec![vec![Cell::Bytes(b"\x93\xfa".to_vec()), Cell::from("x")]];
        assert_eq!(render(rows, &config), "日,x\n");
    }

    #[test]
    fn bom_and_separator_line() {
        let rows = text_rows(&[&["a", "b"]]);
        let config = unix().with_delimiter(';').with_bom(true).with_set_separator(true);
        let out = serialize(rows, &config).unwrap();
        assert_eq!(out, b"\xEF\xBB\xBFsep=;\na;b\n".to_vec());
    }

    #[test]
    fn utf16_bom_and_rows() {
        let le = TextEncoding::for_label("UTF-16LE").unwrap();
        let out = serialize(text_rows(&[&["a"]]), &unix().with_target_encoding(le).with_bom(true)).unwrap();
        assert_eq!(out, b"\xFF\xFEa\x00\n\x00".to_vec());
    }

    #[test]
    fn bom_for_encoding_without_one_is_skipped() {
        let sjis = TextEncoding::for_label("SJIS").unwrap();
        let out = serialize(text_rows(&[&["a"]]), &unix().with_target_encoding(sjis).with_bom(true)).unwrap();
        assert_eq!(out, b"a\n".to_vec());
    }

    #[test]
    fn empty_document_keeps_preamble() {
        let rows: Vec<Vec<Cell>> = Vec::new();
        assert!(serialize(rows.clone(), &unix()).unwrap().is_empty());
        assert_eq!(
            serialize(rows, &unix().with_bom(true)).unwrap(),
            b"\xEF\xBB\xBF".to_vec()
        );
    }

    #[test]
    fn invalid_config_rejected_up_front() {
        let config = unix().with_delimiter('"');
        assert!(matches!(
            CsvWriter::new(Vec::new(), config),
            Err(WriteError::Configuration(_))
        ));
    }

    #[test]
    fn writer_counts_rows_and_bytes() {
        let mut writer = CsvWriter::new(Vec::new(), unix().with_bom(true)).unwrap();
        writer.write_row([Cell::from("ab")]).unwrap();
        writer.write_row(vec![Cell::Int(1), Cell::Int(2)]).unwrap();
        assert_eq!(writer.rows_written(), 2);
        assert_eq!(writer.bytes_written(), 3 + 3 + 4);
        assert_eq!(writer.finish().unwrap(), b"\xEF\xBB\xBFab\n1,2\n".to_vec());
    }

    #[test]
    fn variable_length_rows_pass_through() {
        let rows = text_rows(&[&["a"], &["b", "c", "d"], &[]]);
        assert_eq!(render(rows, &unix()), "a\nb,c,d\n\n");
    }

    fn parse_back(bytes: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_owned).collect())
            .collect()
    }

    proptest! {
        #[test]
        fn prop_roundtrips_through_csv_reader(
            rows in prop::collection::vec(
                prop::collection::vec("[a-z ,\"\n\r\t;']{0,8}", 2..5),
                1..6,
            )
        ) {
            let cells: Vec<Vec<Cell>> = rows
                .iter()
                .map(|row| row.iter().map(|s| Cell::from(s.as_str())).collect())
                .collect();
            let out = serialize(cells, &unix()).unwrap();
            prop_assert_eq!(parse_back(&out), rows);
        }

        #[test]
        fn prop_reserializing_parsed_output_is_stable(
            rows in prop::collection::vec(
                prop::collection::vec("[a-z ,\"\n\r\t;']{0,8}", 2..5),
                1..6,
            ),
            whitespace in any::<bool>(),
        ) {
            let style = if whitespace { QuoteStyle::Whitespace } else { QuoteStyle::Necessary };
            let config = unix().with_quote_style(style);
            let to_cells = |rows: &[Vec<String>]| -> Vec<Vec<Cell>> {
                rows.iter()
                    .map(|row| row.iter().map(|s| Cell::from(s.as_str())).collect())
                    .collect()
            };

            let first = serialize(to_cells(&rows), &config).unwrap();
            let second = serialize(to_cells(&parse_back(&first)), &config).unwrap();
            prop_assert_eq!(second, first);
        }

        #[test]
        fn prop_plain_text_is_never_quoted(text in "[A-Za-z0-9 _.;:'\t-]{0,16}") {
            let out = render(vec![vec![Cell::from(text.as_str())]], &unix());
            prop_assert_eq!(out, format!("{text}\n"));
        }

        #[test]
        fn prop_no_enclosure_emits_literal_cells(
            row in prop::collection::vec("[a-z,\" ]{0,6}", 1..5)
        ) {
            let cells: Vec<Cell> = row.iter().map(|s| Cell::from(s.as_str())).collect();
            let out = render(vec![cells], &unix().with_enclosure(None));
            prop_assert_eq!(out, format!("{}\n", row.join(",")));
        }
    }
}
