use std::fmt;
use std::sync::Arc;

use knot_ir::{LexErrorKind, TokenKind};

/// Filename recorded for input that did not come from a file.
pub const STRING_FILENAME: &str = "<string>";

/// Why a parse stopped.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ErrorKind {
    /// Nothing has gone wrong yet. A fresh record starts here; a returned
    /// diagnostic never carries it.
    #[default]
    Ok,
    /// The input ended while more was needed.
    EndOfFile,
    /// The input bytes could not be decoded.
    DecodeFailure,
    OutOfMemory,
    /// The automaton rejected a token. See [`Diagnostic::token`] and
    /// [`Diagnostic::expected`].
    SyntaxError,
    /// Single-statement mode found more than one statement.
    MalformedSingleStatement,
    /// A tree came back in a shape the driver cannot post-process.
    InternalInvariantViolation,
    /// A character that starts no token.
    BadToken,
    EolInString,
    EofInTripleString,
    /// A dedent to a column no enclosing block uses.
    Dedent,
    TabSpace,
    TooDeep,
    LineContinuation,
}

impl ErrorKind {
    /// Exception-style class a caller would report this under.
    pub fn category(self) -> &'static str {
        match self {
            ErrorKind::Ok => "Ok",
            ErrorKind::OutOfMemory => "MemoryError",
            ErrorKind::DecodeFailure => "UnicodeDecodeError",
            ErrorKind::Dedent | ErrorKind::TooDeep => "IndentationError",
            ErrorKind::TabSpace => "TabError",
            ErrorKind::InternalInvariantViolation => "SystemError",
            ErrorKind::EndOfFile
            | ErrorKind::SyntaxError
            | ErrorKind::MalformedSingleStatement
            | ErrorKind::BadToken
            | ErrorKind::EolInString
            | ErrorKind::EofInTripleString
            | ErrorKind::LineContinuation => "SyntaxError",
        }
    }
}

impl From<LexErrorKind> for ErrorKind {
    fn from(kind: LexErrorKind) -> Self {
        match kind {
            LexErrorKind::Eof => ErrorKind::EndOfFile,
            LexErrorKind::BadToken => ErrorKind::BadToken,
            LexErrorKind::EolInString => ErrorKind::EolInString,
            LexErrorKind::EofInTripleString => ErrorKind::EofInTripleString,
            LexErrorKind::Dedent => ErrorKind::Dedent,
            LexErrorKind::TabSpace => ErrorKind::TabSpace,
            LexErrorKind::TooDeep => ErrorKind::TooDeep,
            LexErrorKind::LineContinuation => ErrorKind::LineContinuation,
            LexErrorKind::Decode => ErrorKind::DecodeFailure,
            LexErrorKind::OutOfMemory => ErrorKind::OutOfMemory,
        }
    }
}

/// Everything a caller needs to report a failed parse.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    /// File the input came from, or [`STRING_FILENAME`].
    pub filename: Arc<str>,
    /// 1-based line of the scan position when the parse stopped; 0 if the
    /// parse never got as far as reading.
    pub line: u32,
    /// Byte offset of the scan position within `text`.
    pub offset: usize,
    /// The source's buffered text at the failure, up to its fill point.
    pub text: Option<String>,
    /// Kind of the token the automaton rejected.
    pub token: Option<TokenKind>,
    /// The single token kind the automaton would have accepted instead.
    pub expected: Option<TokenKind>,
}

impl Diagnostic {
    /// A fresh record for one parse attempt.
    pub fn new(filename: Option<Arc<str>>) -> Self {
        Diagnostic {
            kind: ErrorKind::Ok,
            filename: filename.unwrap_or_else(|| Arc::from(STRING_FILENAME)),
            line: 0,
            offset: 0,
            text: None,
            token: None,
            expected: None,
        }
    }

    /// Record with `kind` already set.
    pub fn with_kind(kind: ErrorKind, filename: Option<Arc<str>>) -> Self {
        Diagnostic {
            kind,
            ..Diagnostic::new(filename)
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.kind == ErrorKind::Ok
    }

    /// The message a caller shows for this failure.
    pub fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Ok => "no error",
            ErrorKind::SyntaxError => {
                if self.expected == Some(TokenKind::Indent) {
                    "expected an indented block"
                } else if self.token == Some(TokenKind::Indent) {
                    "unexpected indent"
                } else if self.token == Some(TokenKind::Dedent) {
                    "unexpected unindent"
                } else {
                    "invalid syntax"
                }
            }
            ErrorKind::EndOfFile => "unexpected EOF while parsing",
            ErrorKind::DecodeFailure => "could not decode source text",
            ErrorKind::OutOfMemory => "out of memory while parsing",
            ErrorKind::MalformedSingleStatement => {
                "multiple statements found while compiling a single statement"
            }
            ErrorKind::InternalInvariantViolation => "internal parser error",
            ErrorKind::BadToken => "invalid token",
            ErrorKind::EolInString => "EOL while scanning string literal",
            ErrorKind::EofInTripleString => "EOF while scanning triple-quoted string literal",
            ErrorKind::Dedent => "unindent does not match any outer indentation level",
            ErrorKind::TabSpace => "inconsistent use of tabs and spaces in indentation",
            ErrorKind::TooDeep => "too many levels of indentation",
            ErrorKind::LineContinuation => {
                "unexpected character after line continuation character"
            }
        }
    }

    /// Category under which [`message`](Self::message) is reported.
    ///
    /// Syntax errors about indentation are reported as indentation errors.
    pub fn category(&self) -> &'static str {
        if self.kind == ErrorKind::SyntaxError
            && (self.expected == Some(TokenKind::Indent)
                || matches!(self.token, Some(TokenKind::Indent | TokenKind::Dedent)))
        {
            return "IndentationError";
        }
        self.kind.category()
    }

    /// The line of `text` that contains `offset`, without its newline, and
    /// the byte offset of the error within that line.
    pub fn error_line(&self) -> Option<(&str, usize)> {
        let text = self.text.as_deref()?;
        let mut offset = self.offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        // An offset just past the final newline points at the end of that line.
        if offset == text.len() && text.ends_with('\n') {
            offset = text.trim_end_matches(['\n', '\r']).len();
        }
        let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
        Some((text[start..end].trim_end_matches('\r'), offset - start))
    }

    /// 1-based character column of the last character the source consumed,
    /// which is the end of the offending token.
    pub fn column(&self) -> Option<usize> {
        let (line, offset) = self.error_line()?;
        let prefix = line.get(..offset.min(line.len())).unwrap_or(line);
        Some(prefix.chars().count().max(1))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Diagnostic {}
