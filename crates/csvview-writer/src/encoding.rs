//! Text encodings
//!
//! [`TextEncoding`] wraps an `encoding_rs` encoding and adds what the WHATWG
//! encoders leave out: UTF-16 output and byte-order marks.

use encoding_rs::{EncoderResult, Encoding, REPLACEMENT, UTF_16BE, UTF_16LE, UTF_8};
use std::borrow::Cow;
use std::fmt;

/// A character encoding for CSV input or output
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    /// UTF-8, the default for both input and output
    #[inline]
    #[must_use]
    pub fn utf8() -> Self {
        Self(UTF_8)
    }

    /// Look up an encoding by WHATWG label (`"SJIS"`, `"windows-1252"`, ...)
    ///
    /// # Errors
    /// Returns error if the label is unknown or names the replacement encoding
    pub fn for_label(label: &str) -> Result<Self, EncodingError> {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) if encoding == REPLACEMENT => {
                Err(EncodingError::Unsupported(encoding.name()))
            }
            Some(encoding) => Ok(Self(encoding)),
            None => Err(EncodingError::UnknownLabel(label.to_owned())),
        }
    }

    /// Canonical encoding name
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Whether this is UTF-8
    #[inline]
    #[must_use]
    pub fn is_utf8(self) -> bool {
        self.0 == UTF_8
    }

    /// Byte-order mark; empty for encodings that have none
    #[must_use]
    pub fn bom(self) -> &'static [u8] {
        if self.0 == UTF_8 {
            b"\xEF\xBB\xBF"
        } else if self.0 == UTF_16LE {
            b"\xFF\xFE"
        } else if self.0 == UTF_16BE {
            b"\xFE\xFF"
        } else {
            b""
        }
    }

    /// Encode text, failing on the first unmappable character
    ///
    /// # Errors
    /// Returns [`EncodingError::Unmappable`] instead of substituting
    pub fn encode(self, text: &str) -> Result<Cow<'_, [u8]>, EncodingError> {
        if self.0 == UTF_8 {
            return Ok(Cow::Borrowed(text.as_bytes()));
        }
        if self.0 == UTF_16LE {
            return Ok(Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect()));
        }
        if self.0 == UTF_16BE {
            return Ok(Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()));
        }

        let mut encoder = self.0.new_encoder();
        let mut out = Vec::with_capacity(text.len() + 16);
        let mut input = text;
        loop {
            let (result, read) =
                encoder.encode_from_utf8_to_vec_without_replacement(input, &mut out, true);
            input = &input[read..];
            match result {
                EncoderResult::InputEmpty => return Ok(Cow::Owned(out)),
                EncoderResult::OutputFull => out.reserve(input.len().max(16) * 2),
                EncoderResult::Unmappable(character) => {
                    return Err(EncodingError::Unmappable {
                        encoding: self.name(),
                        character,
                    });
                }
            }
        }
    }

    /// Decode bytes, failing on malformed input
    ///
    /// # Errors
    /// Returns [`EncodingError::Malformed`] instead of substituting
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, EncodingError> {
        self.0
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or(EncodingError::Malformed {
                encoding: self.name(),
            })
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextEncoding").field(&self.name()).finish()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transcoding failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// Label names no known encoding
    #[error("unknown encoding label: '{0}'")]
    UnknownLabel(String),

    /// Encoding exists but cannot be used here
    #[error("unsupported encoding: {0}")]
    Unsupported(&'static str),

    /// Character has no representation in the target encoding
    #[error("character {character:?} cannot be represented in {encoding}")]
    Unmappable {
        encoding: &'static str,
        character: char,
    },

    /// Input bytes are not valid in the source encoding
    #[error("input is not valid {encoding}")]
    Malformed { encoding: &'static str },
}
