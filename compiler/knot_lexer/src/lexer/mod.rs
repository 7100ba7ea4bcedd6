//! Line-oriented tokenizer implementing [`TokenSource`].
//!
//! The lexer owns the whole decoded text and walks it once. Layout
//! (indentation, newlines, continuation lines, bracket nesting) and string
//! literals are handled here; everything else goes through the `logos`
//! scanner in [`raw_token`](crate::raw_token).
//!
//! Two details matter to the driver:
//!
//! - A NEWLINE token leaves the line counter on the line it ends. The
//!   counter moves when the next token is requested, so a failure on a
//!   NEWLINE reports the line that holds it.
//! - At end of input the lexer only emits the pending dedents itself when
//!   the input ends at the start of a line. Otherwise the indentation stays
//!   open and the driver is expected to synthesize the terminator.

use knot_ir::{LexErrorKind, Lexeme, Span, StopReason, Token, TokenKind, TokenSource};
use memchr::memchr;
use tracing::trace;

use crate::indent::{self, Change, IndentStack, Measure};
use crate::pragma::type_ignore_tag;
use crate::raw_token::{self, RawToken};
use crate::SourceText;

pub struct Lexer {
    text: String,
    encoding: Option<String>,
    pos: usize,
    line: u32,
    line_start: usize,
    /// A NEWLINE was returned; the next request starts a new line.
    line_pending: bool,
    at_bol: bool,
    /// The current line holds only whitespace and comments so far.
    blank_line: bool,
    pending_indent: bool,
    pending_dedents: usize,
    nesting: usize,
    indents: IndentStack,
    async_always: bool,
    async_def: bool,
    async_def_indent: usize,
    async_def_nl: bool,
    stop: StopReason,
}

impl Lexer {
    pub fn new(source: SourceText) -> Self {
        let (text, encoding) = source.into_parts();
        Lexer {
            text,
            encoding,
            pos: 0,
            line: 1,
            line_start: 0,
            line_pending: false,
            at_bol: true,
            blank_line: false,
            pending_indent: false,
            pending_dedents: 0,
            nesting: 0,
            indents: IndentStack::new(),
            async_always: false,
            async_def: false,
            async_def_indent: 0,
            async_def_nl: false,
            stop: StopReason::Running,
        }
    }

    /// Treat `async` and `await` as keywords everywhere, not only inside
    /// `async def`.
    #[must_use]
    pub fn async_always(mut self, on: bool) -> Self {
        self.async_always = on;
        self
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn start_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    fn lexeme(&self, kind: TokenKind, range: Option<std::ops::Range<usize>>) -> Lexeme {
        Self::lexeme_at(kind, range, self.line, self.line_start)
    }

    fn lexeme_at(
        kind: TokenKind,
        range: Option<std::ops::Range<usize>>,
        line: u32,
        line_start: usize,
    ) -> Lexeme {
        Lexeme {
            kind,
            span: range.and_then(|r| Span::try_from_range(r).ok()),
            line,
            line_start: u32::try_from(line_start).unwrap_or(u32::MAX),
        }
    }

    fn fail(&mut self, kind: LexErrorKind) -> LexErrorKind {
        self.stop = if kind == LexErrorKind::Eof {
            StopReason::Exhausted
        } else {
            StopReason::Failed(kind)
        };
        kind
    }

    fn scan(&mut self) -> Result<Lexeme, LexErrorKind> {
        if self.line_pending {
            self.line_pending = false;
            self.start_line();
        }
        loop {
            if self.pending_dedents > 0 {
                self.pending_dedents -= 1;
                return Ok(self.lexeme(TokenKind::Dedent, None));
            }
            if self.pending_indent {
                self.pending_indent = false;
                return Ok(self.lexeme(TokenKind::Indent, None));
            }
            if self.at_bol {
                self.at_bol = false;
                self.indentation()?;
                if self.pending_indent || self.pending_dedents > 0 {
                    continue;
                }
            }

            let (_, blanks) = indent::measure(&self.text[self.pos..]);
            self.pos += blanks;
            let start = self.pos;
            let Some(c) = self.peek() else {
                return Ok(self.end_of_input());
            };
            match c {
                '#' => {
                    if let Some(lexeme) = self.comment() {
                        return Ok(lexeme);
                    }
                }
                '\n' | '\r' => {
                    if let Some(lexeme) = self.newline(start) {
                        return Ok(lexeme);
                    }
                }
                '\\' => self.continuation()?,
                _ if string_prefix_len(&self.text.as_bytes()[start..]).is_some() => {
                    return self.string(start);
                }
                _ => return self.raw(start),
            }
        }
    }

    fn indentation(&mut self) -> Result<(), LexErrorKind> {
        let (m, len) = indent::measure(&self.text[self.pos..]);
        self.pos += len;
        let next = self.peek();
        self.blank_line = matches!(next, Some('#' | '\n' | '\r'));
        if self.blank_line || self.nesting > 0 {
            return Ok(());
        }
        // End of input closes every block.
        let m = if next.is_none() { Measure::ZERO } else { m };
        match self.indents.apply(m)? {
            Change::Same => {}
            Change::Indent => self.pending_indent = true,
            Change::Dedent(count) => self.pending_dedents = count,
        }
        if self.async_def && self.async_def_nl && self.async_def_indent >= self.indents.depth() {
            self.async_def = false;
            self.async_def_nl = false;
            self.async_def_indent = 0;
        }
        Ok(())
    }

    fn end_of_input(&mut self) -> Lexeme {
        self.stop = if self.nesting > 0 {
            StopReason::Exhausted
        } else {
            StopReason::Finished
        };
        self.lexeme(TokenKind::EndMarker, None)
    }

    fn comment(&mut self) -> Option<Lexeme> {
        let start = self.pos;
        let rest = &self.text[start..];
        let len = rest.find(['\n', '\r']).unwrap_or(rest.len());
        let tag = type_ignore_tag(&rest[..len]);
        self.pos = start + len;
        let tag = tag?;
        let lexeme = self.lexeme(TokenKind::TypeIgnore, Some(start + tag..start + len));
        // A pragma alone on its line takes the line's newline with it.
        if self.blank_line {
            let len = newline_len(&self.text.as_bytes()[self.pos..]);
            if len > 0 {
                self.pos += len;
                self.start_line();
                self.at_bol = true;
            }
        }
        Some(lexeme)
    }

    fn newline(&mut self, start: usize) -> Option<Lexeme> {
        self.pos += newline_len(&self.text.as_bytes()[start..]);
        self.at_bol = true;
        if self.blank_line || self.nesting > 0 {
            self.start_line();
            return None;
        }
        if self.async_def {
            self.async_def_nl = true;
        }
        self.line_pending = true;
        Some(self.lexeme(TokenKind::Newline, Some(start..start)))
    }

    fn continuation(&mut self) -> Result<(), LexErrorKind> {
        self.pos += 1;
        let len = newline_len(&self.text.as_bytes()[self.pos..]);
        if len == 0 {
            return Err(LexErrorKind::LineContinuation);
        }
        self.pos += len;
        self.start_line();
        if self.pos == self.text.len() {
            return Err(LexErrorKind::Eof);
        }
        Ok(())
    }

    fn string(&mut self, start: usize) -> Result<Lexeme, LexErrorKind> {
        let (line, line_start) = (self.line, self.line_start);
        let scanned = scan_string(self.text.as_bytes(), start);
        self.pos = scanned.end;
        self.line += scanned.newlines;
        if let Some(at) = scanned.last_line_start {
            self.line_start = at;
        }
        if let Some(kind) = scanned.error {
            return Err(kind);
        }
        Ok(Self::lexeme_at(TokenKind::String, Some(start..scanned.end), line, line_start))
    }

    fn raw(&mut self, start: usize) -> Result<Lexeme, LexErrorKind> {
        let Some((token, range)) = raw_token::scan(&self.text[start..]) else {
            return Ok(self.end_of_input());
        };
        let range = start + range.start..start + range.end;
        self.pos = range.end;
        let Some(token) = token else {
            return Err(LexErrorKind::BadToken);
        };
        match token.nesting() {
            1 => self.nesting += 1,
            -1 => self.nesting = self.nesting.saturating_sub(1),
            _ => {}
        }
        let keyword = match &self.text[range.clone()] {
            "async" => Some(TokenKind::Async),
            "await" => Some(TokenKind::Await),
            _ => None,
        };
        let kind = match (token, keyword) {
            (RawToken::Name, Some(keyword)) => self.classify_keyword(keyword),
            (other, _) => other.kind(),
        };
        Ok(self.lexeme(kind, Some(range)))
    }

    /// `async` and `await` are keywords inside an `async def` and names
    /// elsewhere, unless the lexer was told to always treat them as
    /// keywords.
    fn classify_keyword(&mut self, keyword: TokenKind) -> TokenKind {
        if self.async_always || self.async_def {
            return keyword;
        }
        if keyword == TokenKind::Async && self.def_follows() {
            self.async_def = true;
            self.async_def_nl = false;
            self.async_def_indent = self.indents.depth();
            return keyword;
        }
        TokenKind::Name
    }

    fn def_follows(&self) -> bool {
        let rest = &self.text[self.pos..];
        let rest = rest.trim_start_matches([' ', '\t', '\x0c']);
        matches!(
            raw_token::scan(rest),
            Some((Some(RawToken::Name), range)) if rest.get(range.clone()) == Some("def")
        )
    }
}

/// Bytes of a newline at the start of `bytes`: 2 for `\r\n`, 1 for `\n`
/// or `\r`, 0 otherwise.
fn newline_len(bytes: &[u8]) -> usize {
    match bytes {
        [b'\r', b'\n', ..] => 2,
        [b'\n' | b'\r', ..] => 1,
        _ => 0,
    }
}

/// How far a string literal reaches.
struct StringEnd {
    end: usize,
    /// Line breaks inside the literal.
    newlines: u32,
    last_line_start: Option<usize>,
    error: Option<LexErrorKind>,
}

/// Scan the string literal starting at `start`, prefix included.
fn scan_string(bytes: &[u8], start: usize) -> StringEnd {
    let prefix = bytes
        .get(start..)
        .and_then(|rest| string_prefix_len(rest))
        .unwrap_or_default();
    let quote = bytes.get(start + prefix).copied().unwrap_or(b'"');
    let triple = bytes.get(start + prefix + 1) == Some(&quote)
        && bytes.get(start + prefix + 2) == Some(&quote);
    let open = if triple { 3 } else { 1 };
    let mut scan = StringEnd {
        end: start + prefix + open,
        newlines: 0,
        last_line_start: None,
        error: None,
    };
    let mut run = 0;
    loop {
        let Some(&b) = bytes.get(scan.end) else {
            scan.error = Some(if triple {
                LexErrorKind::EofInTripleString
            } else {
                LexErrorKind::EolInString
            });
            return scan;
        };
        scan.end += 1;
        if b == quote {
            run += 1;
            if run == open {
                return scan;
            }
            continue;
        }
        run = 0;
        match b {
            b'\\' => {
                let len = newline_len(&bytes[scan.end..]);
                if len > 0 {
                    scan.end += len;
                    scan.newlines += 1;
                    scan.last_line_start = Some(scan.end);
                } else if scan.end < bytes.len() {
                    scan.end += 1;
                }
            }
            b'\r' | b'\n' if triple => {
                if b == b'\r' && bytes.get(scan.end) == Some(&b'\n') {
                    scan.end += 1;
                }
                scan.newlines += 1;
                scan.last_line_start = Some(scan.end);
            }
            b'\r' | b'\n' => {
                scan.end -= 1;
                scan.error = Some(LexErrorKind::EolInString);
                return scan;
            }
            _ => {}
        }
    }
}

/// Length of the string prefix (`r`, `b`, `rb`, `f`, ...) if `bytes`
/// starts a string literal.
fn string_prefix_len(bytes: &[u8]) -> Option<usize> {
    let is_prefix = |b: u8| matches!(b.to_ascii_lowercase(), b'r' | b'b' | b'u' | b'f');
    let mut len = 0;
    while len < 2 && bytes.get(len).copied().is_some_and(is_prefix) {
        len += 1;
    }
    loop {
        match bytes.get(len) {
            Some(b'\'' | b'"') => return Some(len),
            _ if len == 0 => return None,
            _ => len -= 1,
        }
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Result<Lexeme, LexErrorKind> {
        if let StopReason::Failed(kind) = self.stop {
            return Err(kind);
        }
        match self.scan() {
            Ok(lexeme) => {
                trace!(kind = %lexeme.kind, line = lexeme.line, "token");
                Ok(lexeme)
            }
            Err(kind) => {
                trace!(?kind, line = self.line, "lexical error");
                Err(self.fail(kind))
            }
        }
    }

    fn text(&self, span: Span) -> &str {
        self.text.get(span.to_range()).unwrap_or_default()
    }

    fn indentation_depth(&self) -> usize {
        self.indents.depth()
    }

    fn set_pending_dedents(&mut self, count: usize) {
        self.pending_dedents = count;
        self.pending_indent = false;
        self.indents.reset();
    }

    fn detected_encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn buffered_input(&self) -> Option<&str> {
        let start = self.line_start.min(self.text.len());
        let bytes = &self.text.as_bytes()[start..];
        let end = memchr(b'\n', bytes).map_or(self.text.len(), |i| start + i + 1);
        let line = &self.text[start..end];
        (!line.is_empty()).then_some(line)
    }

    fn scan_offset(&self) -> usize {
        self.pos.saturating_sub(self.line_start)
    }

    fn remaining_input(&self) -> &str {
        &self.text[self.pos..]
    }

    fn stop_reason(&self) -> StopReason {
        self.stop
    }
}

/// Read `lexer` to its end marker, copying each token's text out.
///
/// This is the plain token stream: no terminator or dedents are synthesized
/// for input without a trailing newline.
pub fn tokenize(lexer: &mut Lexer) -> Result<Vec<Token>, LexErrorKind> {
    let mut tokens = Vec::new();
    loop {
        let lexeme = lexer.next_token()?;
        let text = lexeme.span.map(|span| lexer.text(span)).unwrap_or_default();
        tokens.push(Token::new(lexeme.kind, text, lexeme.line, lexeme.column()));
        if lexeme.kind == TokenKind::EndMarker {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
