//! The two collaborator seams of the parse driver.
//!
//! - [`TokenSource`]: produces classified tokens with positions and exposes
//!   the few pieces of lexer state the driver needs (indentation depth,
//!   pending dedents, buffered text, detected encoding).
//! - [`Automaton`]: accepts one token at a time and either asks for more,
//!   accepts with a finished tree, or rejects.
//!
//! Neither seam knows about the other; the driver owns both for the length
//! of one parse.

use bitflags::bitflags;

use crate::{Node, Span, Token, TokenKind};

bitflags! {
    /// Opaque future-feature bits owned by the automaton.
    ///
    /// The driver seeds the automaton with the caller's bits and copies the
    /// automaton's bits back when the parse ends.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FutureFlags: u32 {
        /// `from __future__ import barry_as_FLUFL`: `<>` is the only spelling
        /// of not-equal.
        const BARRY_AS_FLUFL = 1 << 0;
    }
}

/// One token as reported by a [`TokenSource`], before the driver copies its
/// text out.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Lexeme {
    pub kind: TokenKind,
    /// Byte range of the token's text, `None` for tokens with no text in the
    /// source (synthesized dedents, the end marker).
    pub span: Option<Span>,
    /// 1-based line the token was read on.
    pub line: u32,
    /// Byte offset where that line starts.
    pub line_start: u32,
}

impl Lexeme {
    /// Byte column of the token on its line.
    ///
    /// `None` when the token has no text, or when it starts before the
    /// recorded line start (a token continued from an earlier line).
    pub fn column(&self) -> Option<u32> {
        let span = self.span?;
        span.start.checked_sub(self.line_start)
    }
}

/// Why a token source failed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LexErrorKind {
    /// Input ended where more was required.
    Eof,
    /// A character that starts no token.
    BadToken,
    /// End of line inside a single-quoted string.
    EolInString,
    /// End of input inside a triple-quoted string.
    EofInTripleString,
    /// Dedent to a column that matches no enclosing indentation level.
    Dedent,
    /// Tabs and spaces mixed inconsistently in indentation.
    TabSpace,
    /// Indentation nested deeper than the lexer supports.
    TooDeep,
    /// Something other than a newline after a `\` continuation.
    LineContinuation,
    /// The input bytes could not be decoded.
    Decode,
    /// The source could not allocate.
    OutOfMemory,
}

/// Where a token source stands once it stops producing tokens.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum StopReason {
    /// Still producing tokens.
    #[default]
    Running,
    /// Reached the end of input with every construct closed.
    Finished,
    /// Ran out of input while a construct (bracket, continuation) was open.
    /// A parse that fails in this state needed more input rather than
    /// receiving bad input.
    Exhausted,
    /// Stopped on a lexical error.
    Failed(LexErrorKind),
}

/// A lexical analyzer as seen by the driver.
pub trait TokenSource {
    /// Produce the next token.
    fn next_token(&mut self) -> Result<Lexeme, LexErrorKind>;

    /// Text covered by `span`.
    fn text(&self, span: Span) -> &str;

    /// Number of indentation levels currently open.
    fn indentation_depth(&self) -> usize;

    /// Queue `count` dedent tokens to be produced before anything else and
    /// reset the indentation depth to zero.
    fn set_pending_dedents(&mut self, count: usize);

    /// Encoding declared by or detected in the input, if any.
    fn detected_encoding(&self) -> Option<&str>;

    /// 1-based line of the scan position.
    fn line(&self) -> u32;

    /// The source's current buffer, from its start to the fill point.
    /// `None` when nothing is buffered.
    fn buffered_input(&self) -> Option<&str>;

    /// Byte offset of the scan position within [`buffered_input`](Self::buffered_input).
    fn scan_offset(&self) -> usize;

    /// Replay of the text not yet consumed, from the scan position to the
    /// end of input.
    fn remaining_input(&self) -> &str;

    fn stop_reason(&self) -> StopReason;
}

/// Result of feeding one token to an [`Automaton`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Step {
    /// The token was consumed; more input is needed.
    Continue,
    /// The start symbol is complete. The automaton hands over its tree.
    Accept(Node),
}

/// Why an [`Automaton`] refused a token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Reject {
    /// The token cannot continue any production at this point. `expected`
    /// is set when exactly one token kind could have.
    Syntax { expected: Option<TokenKind> },
    /// The automaton could not allocate (tree growth or its own stack).
    OutOfMemory,
}

/// A grammar automaton as seen by the driver.
pub trait Automaton {
    /// Feed one token. The automaton takes ownership of the token whether or
    /// not it is accepted.
    fn add_token(&mut self, token: Token) -> Result<Step, Reject>;

    fn future_flags(&self) -> FutureFlags;

    fn set_future_flags(&mut self, flags: FutureFlags);
}
