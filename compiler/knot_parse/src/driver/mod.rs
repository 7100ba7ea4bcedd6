//! The token loop and the diagnostic built when it fails.
//!
//! One call to [`parse_tokens`] owns its token source and automaton for the
//! whole parse:
//!
//! 1. Pull a token. A lexical error ends the parse.
//! 2. The first end marker after real input becomes a NEWLINE, and the
//!    source is told to close every open block with dedents (unless
//!    [`ParseFlags::DONT_IMPLY_DEDENT`] is set).
//! 3. `TYPE_IGNORE` pragmas go to the annotation buffer, never to the
//!    automaton.
//! 4. Everything else is fed to the automaton until it accepts or rejects.
//!
//! An accepted tree is then post-processed (see [`crate::postprocess`]).

use std::collections::TryReserveError;
use std::sync::Arc;

use knot_diagnostic::{Diagnostic, ErrorKind, STRING_FILENAME};
use knot_ir::{
    Automaton, FutureFlags, Lexeme, Node, Reject, Step, StopReason, Token, TokenKind,
    TokenSource,
};
use tracing::{debug, trace, warn};

use crate::annotations::AnnotationBuffer;
use crate::options::{ParseFlags, ParseOptions, StartRule};
use crate::postprocess;

/// Why a parse stopped without a tree, before positions are filled in.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Failure {
    pub kind: ErrorKind,
    pub token: Option<TokenKind>,
    pub expected: Option<TokenKind>,
}

impl Failure {
    pub(crate) fn new(kind: impl Into<ErrorKind>) -> Self {
        Failure {
            kind: kind.into(),
            token: None,
            expected: None,
        }
    }
}

impl From<TryReserveError> for Failure {
    fn from(_: TryReserveError) -> Self {
        Failure::new(ErrorKind::OutOfMemory)
    }
}

/// Copy `text` into a fresh string, reporting allocation failure.
pub(crate) fn owned_text(text: &str) -> Result<String, TryReserveError> {
    let mut owned = String::new();
    owned.try_reserve_exact(text.len())?;
    owned.push_str(text);
    Ok(owned)
}

/// Parse everything `source` produces with `automaton`.
///
/// `options.future` seeds the automaton and receives its flags back on
/// every exit. `filename` defaults to [`STRING_FILENAME`].
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        start = start.name(),
        filename = filename.as_deref().unwrap_or(STRING_FILENAME),
    )
)]
pub fn parse_tokens<S, A>(
    source: &mut S,
    automaton: &mut A,
    start: StartRule,
    options: &mut ParseOptions,
    filename: Option<Arc<str>>,
) -> Result<Node, Diagnostic>
where
    S: TokenSource + ?Sized,
    A: Automaton + ?Sized,
{
    automaton.set_future_flags(options.future);
    let result = run(source, automaton, start, options);
    options.future = automaton.future_flags();
    result.map_err(|failure| report(source, failure, filename))
}

fn run<S, A>(
    source: &mut S,
    automaton: &mut A,
    start: StartRule,
    options: &ParseOptions,
) -> Result<Node, Failure>
where
    S: TokenSource + ?Sized,
    A: Automaton + ?Sized,
{
    let annotations =
        AnnotationBuffer::with_capacity(options.annotation_capacity, options.annotation_limit)
            .map_err(Failure::new)?;
    let (tree, annotations) = TokenLoop {
        source: &mut *source,
        automaton,
        flags: options.flags,
        annotations,
        started: false,
    }
    .run()?;
    postprocess::finish(source, tree, annotations, start)
}

struct TokenLoop<'a, S: ?Sized, A: ?Sized> {
    source: &'a mut S,
    automaton: &'a mut A,
    flags: ParseFlags,
    annotations: AnnotationBuffer,
    /// A token other than the end marker has been seen since the last
    /// synthesized terminator.
    started: bool,
}

impl<S, A> TokenLoop<'_, S, A>
where
    S: TokenSource + ?Sized,
    A: Automaton + ?Sized,
{
    fn run(mut self) -> Result<(Node, AnnotationBuffer), Failure> {
        loop {
            let lexeme = self.source.next_token().map_err(Failure::new)?;
            let kind = self.terminate(lexeme.kind);
            let col = lexeme.column();
            let text = self.token_text(&lexeme)?;
            trace!(
                kind = kind.name(),
                line = lexeme.line,
                col = ?col,
                pragma = kind == TokenKind::TypeIgnore,
                "token"
            );

            if kind == TokenKind::TypeIgnore {
                self.annotations.push(lexeme.line, text).map_err(Failure::new)?;
                continue;
            }
            if kind == TokenKind::NotEqual {
                self.check_not_equal(&text)?;
            }

            let token = Token::new(kind, text, lexeme.line, col);
            match self.automaton.add_token(token) {
                Ok(Step::Continue) => {}
                Ok(Step::Accept(tree)) => {
                    debug!(nodes = tree.node_count(), "accepted");
                    return Ok((tree, self.annotations));
                }
                Err(Reject::Syntax { expected }) => {
                    return Err(Failure {
                        kind: ErrorKind::SyntaxError,
                        token: Some(kind),
                        expected,
                    });
                }
                Err(Reject::OutOfMemory) => {
                    return Err(Failure {
                        token: Some(kind),
                        ..Failure::new(ErrorKind::OutOfMemory)
                    });
                }
            }
        }
    }

    /// Turn the first end marker after real input into a NEWLINE and queue
    /// the dedents that close the open blocks.
    fn terminate(&mut self, kind: TokenKind) -> TokenKind {
        if kind != TokenKind::EndMarker || !self.started {
            self.started = true;
            return kind;
        }
        self.started = false;
        let depth = self.source.indentation_depth();
        if depth > 0 && !self.flags.contains(ParseFlags::DONT_IMPLY_DEDENT) {
            debug!(depth, "closing open blocks at end of input");
            self.source.set_pending_dedents(depth);
        }
        TokenKind::Newline
    }

    fn token_text(&self, lexeme: &Lexeme) -> Result<String, Failure> {
        let text = lexeme.span.map(|span| self.source.text(span)).unwrap_or_default();
        Ok(owned_text(text)?)
    }

    /// `!=` and `<>` lex to the same kind; which spelling is legal depends
    /// on the automaton's future flags.
    fn check_not_equal(&self, text: &str) -> Result<(), Failure> {
        let barry = self
            .automaton
            .future_flags()
            .contains(FutureFlags::BARRY_AS_FLUFL);
        match (barry, text) {
            (false, "!=") | (true, "<>") => Ok(()),
            (false, _) => Err(Failure::new(ErrorKind::SyntaxError)),
            (true, _) => Err(Failure {
                expected: Some(TokenKind::NotEqual),
                ..Failure::new(ErrorKind::SyntaxError)
            }),
        }
    }
}

/// Fill in where the parse stopped.
///
/// A source that ran out of input inside an open construct turns any
/// failure into [`ErrorKind::EndOfFile`].
fn report<S>(source: &S, failure: Failure, filename: Option<Arc<str>>) -> Diagnostic
where
    S: TokenSource + ?Sized,
{
    let mut diag = Diagnostic {
        token: failure.token,
        expected: failure.expected,
        ..Diagnostic::with_kind(failure.kind, filename)
    };
    if source.stop_reason() == StopReason::Exhausted {
        diag.kind = ErrorKind::EndOfFile;
    }
    diag.line = source.line();
    if let Some(buffer) = source.buffered_input() {
        diag.offset = source.scan_offset();
        match owned_text(buffer) {
            Ok(text) => diag.text = Some(text),
            Err(_) => warn!("no memory to copy the error text"),
        }
    }
    debug!(kind = ?diag.kind, line = diag.line, offset = diag.offset, "parse failed");
    diag
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
