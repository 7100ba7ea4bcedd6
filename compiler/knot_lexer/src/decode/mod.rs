//! Source decoding: bytes in, scannable text out.
//!
//! Cookie-aware decoding honors a UTF-8 byte-order mark and a PEP 263
//! `coding:` comment on either of the first two lines. Raw decoding treats
//! every input as UTF-8.

use memchr::memchr;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Only this many characters of a declared name take part in
/// normalization.
const NORMAL_NAME_LEN: usize = 12;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum DecodeMode {
    /// Honor a byte-order mark and a `coding:` cookie.
    #[default]
    Cookie,
    /// UTF-8 only; cookies are ordinary comments.
    Raw,
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum DecodeError {
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
    #[error("encoding problem: {0} with BOM")]
    BomMismatch(String),
    #[error("encoding problem: {cookie} declared in a source read as {declared}")]
    Conflict { declared: String, cookie: String },
    #[error("'{encoding}' codec can't decode byte 0x{byte:02x} in position {position}")]
    InvalidBytes {
        encoding: &'static str,
        byte: u8,
        position: usize,
    },
    #[error("source of {0} bytes is too large")]
    TooLarge(usize),
}

/// Codecs the lexer can read.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Codec {
    Utf8,
    Latin1,
    Ascii,
}

impl Codec {
    fn lookup(normalized: &str) -> Option<Codec> {
        match normalized {
            "utf-8" | "utf8" => Some(Codec::Utf8),
            "iso-8859-1" | "latin1" | "l1" | "iso8859-1" | "8859" | "cp819" => Some(Codec::Latin1),
            "ascii" | "us-ascii" | "646" => Some(Codec::Ascii),
            _ => None,
        }
    }

    fn decode(self, bytes: &[u8], base: usize) -> Result<String, DecodeError> {
        match self {
            Codec::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(text.to_owned()),
                Err(err) => {
                    let position = err.valid_up_to();
                    Err(DecodeError::InvalidBytes {
                        encoding: "utf-8",
                        byte: bytes.get(position).copied().unwrap_or_default(),
                        position: base + position,
                    })
                }
            },
            Codec::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Codec::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(position) => Err(DecodeError::InvalidBytes {
                    encoding: "ascii",
                    byte: bytes[position],
                    position: base + position,
                }),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }
}

/// Decoded source plus the encoding it was read under, if one was declared
/// or detected.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SourceText {
    text: String,
    encoding: Option<String>,
}

impl SourceText {
    /// Decode `bytes`.
    ///
    /// `declared` is an encoding the caller already knows the input to be
    /// in. It takes precedence over detection, but a cookie that names a
    /// different encoding is an error.
    pub fn decode(
        bytes: &[u8],
        mode: DecodeMode,
        declared: Option<&str>,
    ) -> Result<Self, DecodeError> {
        if u32::try_from(bytes.len()).is_err() {
            return Err(DecodeError::TooLarge(bytes.len()));
        }
        let (body, bom) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest, true),
            None => (bytes, false),
        };
        let base = bytes.len() - body.len();

        if mode == DecodeMode::Raw {
            let text = Codec::Utf8.decode(body, base)?;
            return Ok(SourceText {
                text,
                encoding: Some("utf-8".to_owned()),
            });
        }

        let cookie = find_cookie(body).map(normalize);
        let declared = declared.map(normalize);
        let encoding = match (declared, cookie) {
            (Some(declared), Some(cookie)) if declared != cookie => {
                return Err(DecodeError::Conflict { declared, cookie });
            }
            (Some(name), _) | (None, Some(name)) => Some(name),
            (None, None) if bom => Some("utf-8".to_owned()),
            (None, None) => None,
        };

        let codec = match encoding.as_deref() {
            None => Codec::Utf8,
            Some(name) => {
                let codec = Codec::lookup(name)
                    .ok_or_else(|| DecodeError::UnknownEncoding(name.to_owned()))?;
                if bom && codec != Codec::Utf8 {
                    return Err(DecodeError::BomMismatch(name.to_owned()));
                }
                codec
            }
        };
        let text = codec.decode(body, base)?;
        Ok(SourceText { text, encoding })
    }

    /// Text that is already Unicode. Raw mode reports it as UTF-8; cookie
    /// mode reads it back as the bytes the cookie describes.
    pub fn from_text(text: &str, mode: DecodeMode) -> Result<Self, DecodeError> {
        SourceText::decode(text.as_bytes(), mode, None)
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn into_parts(self) -> (String, Option<String>) {
        (self.text, self.encoding)
    }
}

/// Canonical spelling of an encoding name.
///
/// The UTF-8 and Latin-1 families collapse to `utf-8` and `iso-8859-1`;
/// anything else is only lower-cased with `_` read as `-`.
pub fn normalize(name: &str) -> String {
    let short: String = name
        .chars()
        .take(NORMAL_NAME_LEN)
        .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
        .collect();
    let family = |stem: &str| short == stem || short.starts_with(&format!("{stem}-"));
    if family("utf-8") {
        "utf-8".to_owned()
    } else if family("latin-1") || family("iso-8859-1") || family("iso-latin-1") {
        "iso-8859-1".to_owned()
    } else {
        name.to_ascii_lowercase().replace('_', "-")
    }
}

/// Encoding named by a `coding[:=]` comment on the first line, or on the
/// second when the first holds nothing but a comment.
fn find_cookie(bytes: &[u8]) -> Option<&str> {
    let mut rest = bytes;
    for _ in 0..2 {
        let end = memchr(b'\n', rest).map_or(rest.len(), |i| i + 1);
        let line = std::str::from_utf8(&rest[..end]).ok()?;
        if let Some(name) = cookie_in_line(line) {
            return Some(name);
        }
        let trimmed = line.trim_start_matches([' ', '\t', '\x0c']);
        if !(trimmed.is_empty() || trimmed.starts_with(['#', '\n', '\r'])) {
            return None;
        }
        rest = &rest[end..];
    }
    None
}

fn cookie_in_line(line: &str) -> Option<&str> {
    let comment = line.trim_start_matches([' ', '\t', '\x0c']).strip_prefix('#')?;
    for (at, _) in comment.match_indices("coding") {
        let after = &comment[at + "coding".len()..];
        let Some(value) = after.strip_prefix([':', '=']) else {
            continue;
        };
        let value = value.trim_start_matches([' ', '\t']);
        let len = value
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(value.len());
        if len > 0 {
            return Some(&value[..len]);
        }
    }
    None
}
