//! Entry points that build the reference lexer and grammar automaton and
//! hand them to [`parse_tokens`].

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use knot_diagnostic::{Diagnostic, ErrorKind, STRING_FILENAME};
use knot_grammar::{python, Parser};
use knot_ir::Node;
use knot_lexer::{DecodeError, Lexer, SourceText};
use thiserror::Error;
use tracing::{debug, warn};

use crate::driver::parse_tokens;
use crate::options::{ParseFlags, ParseOptions, StartRule};

/// Failure of an entry point that reads its own input.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] Diagnostic),
}

impl ReadError {
    /// The parse diagnostic, if reading succeeded.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ReadError::Parse(diag) => Some(diag),
            ReadError::Io { .. } => None,
        }
    }
}

/// Parse in-memory text, reported as `<string>`.
pub fn parse_string(
    text: &str,
    start: StartRule,
    options: &mut ParseOptions,
) -> Result<Node, Diagnostic> {
    parse_bytes(text.as_bytes(), None, None, start, options)
}

/// Parse in-memory text, reporting errors against `filename`.
pub fn parse_string_with_filename(
    text: &str,
    filename: &str,
    start: StartRule,
    options: &mut ParseOptions,
) -> Result<Node, Diagnostic> {
    parse_bytes(text.as_bytes(), Some(filename), None, start, options)
}

/// Decode `bytes` and parse them.
///
/// `encoding` is what the caller knows the bytes to be in; it overrides
/// detection but must agree with a cookie if there is one.
pub fn parse_bytes(
    bytes: &[u8],
    filename: Option<&str>,
    encoding: Option<&str>,
    start: StartRule,
    options: &mut ParseOptions,
) -> Result<Node, Diagnostic> {
    let filename: Option<Arc<str>> = filename.map(Arc::from);
    let source = SourceText::decode(bytes, options.decode_mode(), encoding)
        .map_err(|err| decode_failure(bytes, &err, filename.clone()))?;

    let grammar = python().map_err(|err| {
        warn!(%err, "reference grammar failed to build");
        Diagnostic::with_kind(ErrorKind::InternalInvariantViolation, filename.clone())
    })?;
    let Some(mut parser) = Parser::new(grammar, start.symbol()) else {
        warn!(start = start.name(), "no rule for start symbol");
        return Err(Diagnostic::with_kind(
            ErrorKind::InternalInvariantViolation,
            filename,
        ));
    };
    let mut lexer =
        Lexer::new(source).async_always(options.flags.contains(ParseFlags::ASYNC_ALWAYS));
    parse_tokens(&mut lexer, &mut parser, start, options, filename)
}

/// Read and parse the file at `path`.
pub fn parse_file(
    path: &Path,
    encoding: Option<&str>,
    start: StartRule,
    options: &mut ParseOptions,
) -> Result<Node, ReadError> {
    let bytes = fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path.display().to_string();
    Ok(parse_bytes(&bytes, Some(&filename), encoding, start, options)?)
}

/// Read `reader` to its end and parse what it produced.
pub fn parse_reader(
    mut reader: impl Read,
    filename: Option<&str>,
    encoding: Option<&str>,
    start: StartRule,
    options: &mut ParseOptions,
) -> Result<Node, ReadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| ReadError::Io {
            path: PathBuf::from(filename.unwrap_or(STRING_FILENAME)),
            source,
        })?;
    Ok(parse_bytes(&bytes, filename, encoding, start, options)?)
}

/// Diagnostic for input that never reached the lexer. Invalid bytes are
/// located by line.
fn decode_failure(bytes: &[u8], err: &DecodeError, filename: Option<Arc<str>>) -> Diagnostic {
    debug!(%err, "decode failed");
    let mut diag = Diagnostic::with_kind(ErrorKind::DecodeFailure, filename);
    if let DecodeError::InvalidBytes { position, .. } = *err {
        let before = bytes.get(..position).unwrap_or(bytes);
        let newlines = before.iter().filter(|&&b| b == b'\n').count();
        diag.line = u32::try_from(newlines + 1).unwrap_or(u32::MAX);
        let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        diag.offset = position - line_start;
    }
    diag
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn invalid_bytes_are_located() {
        let bytes = b"x = 1\ny = '\xff'\n";
        let err = SourceText::decode(bytes, knot_lexer::DecodeMode::Raw, None).unwrap_err();
        let diag = decode_failure(bytes, &err, None);
        assert_eq!(diag.kind, ErrorKind::DecodeFailure);
        assert_eq!((diag.line, diag.offset), (2, 5));
    }

    #[test]
    fn other_decode_errors_have_no_position() {
        let err = DecodeError::UnknownEncoding("klingon".to_owned());
        let diag = decode_failure(b"", &err, Some(Arc::from("k.py")));
        assert_eq!((diag.line, diag.offset), (0, 0));
        assert_eq!(&*diag.filename, "k.py");
    }
}
