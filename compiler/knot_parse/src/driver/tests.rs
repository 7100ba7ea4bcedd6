use std::collections::VecDeque;

use knot_ir::{LexErrorKind, Span, Symbol};
use pretty_assertions::assert_eq;

use super::*;

// === Collaborators ===

/// Token source that replays a script, then returns end markers forever.
struct Script {
    text: String,
    lexemes: VecDeque<Result<Lexeme, LexErrorKind>>,
    depth: usize,
    queued_dedents: usize,
    dedent_requests: Vec<usize>,
    encoding: Option<String>,
    line: u32,
    remaining: String,
    exhausted: bool,
    stop: StopReason,
}

impl Script {
    /// Each token's text is laid out on one line, separated by spaces.
    fn new(tokens: &[(TokenKind, &str)]) -> Self {
        let mut text = String::new();
        let mut lexemes = VecDeque::new();
        for &(kind, spelling) in tokens {
            let start = u32::try_from(text.len()).unwrap();
            text.push_str(spelling);
            let end = u32::try_from(text.len()).unwrap();
            text.push(' ');
            lexemes.push_back(Ok(Lexeme {
                kind,
                span: Some(Span::new(start, end)),
                line: 1,
                line_start: 0,
            }));
        }
        Script {
            text,
            lexemes,
            depth: 0,
            queued_dedents: 0,
            dedent_requests: Vec::new(),
            encoding: None,
            line: 1,
            remaining: String::new(),
            exhausted: false,
            stop: StopReason::Running,
        }
    }

    fn then_fail(mut self, kind: LexErrorKind) -> Self {
        self.lexemes.push_back(Err(kind));
        self
    }
}

impl TokenSource for Script {
    fn next_token(&mut self) -> Result<Lexeme, LexErrorKind> {
        if self.queued_dedents > 0 {
            self.queued_dedents -= 1;
            return Ok(Lexeme {
                kind: TokenKind::Dedent,
                span: None,
                line: self.line,
                line_start: 0,
            });
        }
        match self.lexemes.pop_front() {
            Some(Err(kind)) => {
                self.stop = StopReason::Failed(kind);
                Err(kind)
            }
            Some(Ok(lexeme)) => Ok(lexeme),
            None => {
                self.stop = if self.exhausted {
                    StopReason::Exhausted
                } else {
                    StopReason::Finished
                };
                Ok(Lexeme {
                    kind: TokenKind::EndMarker,
                    span: None,
                    line: self.line,
                    line_start: 0,
                })
            }
        }
    }

    fn text(&self, span: Span) -> &str {
        &self.text[span.to_range()]
    }

    fn indentation_depth(&self) -> usize {
        self.depth
    }

    fn set_pending_dedents(&mut self, count: usize) {
        self.dedent_requests.push(count);
        self.queued_dedents = count;
        self.depth = 0;
    }

    fn detected_encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn buffered_input(&self) -> Option<&str> {
        (!self.text.is_empty()).then_some(self.text.as_str())
    }

    fn scan_offset(&self) -> usize {
        self.text.len()
    }

    fn remaining_input(&self) -> &str {
        &self.remaining
    }

    fn stop_reason(&self) -> StopReason {
        self.stop
    }
}

/// Automaton that records what it is fed, accepts on one kind and rejects
/// on another. The accepted tree is `root` with one leaf per token seen.
struct Recorder {
    root: Symbol,
    seen: Vec<Token>,
    accept_on: TokenKind,
    reject_on: Option<(TokenKind, Reject)>,
    /// Seeing a NAME with this text sets `BARRY_AS_FLUFL`.
    flufl_name: Option<&'static str>,
    future: FutureFlags,
}

impl Recorder {
    fn new(root: Symbol, accept_on: TokenKind) -> Self {
        Recorder {
            root,
            seen: Vec::new(),
            accept_on,
            reject_on: None,
            flufl_name: None,
            future: FutureFlags::empty(),
        }
    }

    fn module() -> Self {
        Recorder::new(Symbol::FileInput, TokenKind::EndMarker)
    }

    fn rejecting(mut self, kind: TokenKind, reject: Reject) -> Self {
        self.reject_on = Some((kind, reject));
        self
    }

    fn kinds(&self) -> Vec<TokenKind> {
        self.seen.iter().map(|t| t.kind).collect()
    }
}

impl Automaton for Recorder {
    fn add_token(&mut self, token: Token) -> Result<Step, Reject> {
        if token.kind == TokenKind::Name && Some(token.text.as_str()) == self.flufl_name {
            self.future |= FutureFlags::BARRY_AS_FLUFL;
        }
        let kind = token.kind;
        self.seen.push(token);
        if let Some((on, reject)) = self.reject_on {
            if on == kind {
                return Err(reject);
            }
        }
        if kind != self.accept_on {
            return Ok(Step::Continue);
        }
        let mut tree = Node::branch(self.root, 1, Some(0));
        tree.children = self.seen.iter().cloned().map(Node::leaf).collect();
        Ok(Step::Accept(tree))
    }

    fn future_flags(&self) -> FutureFlags {
        self.future
    }

    fn set_future_flags(&mut self, flags: FutureFlags) {
        self.future = flags;
    }
}

fn parse(source: &mut Script, automaton: &mut Recorder, start: StartRule) -> Result<Node, Diagnostic> {
    parse_tokens(source, automaton, start, &mut ParseOptions::default(), None)
}

// === End of input ===

#[test]
fn end_marker_after_input_becomes_newline() {
    let mut source = Script::new(&[(TokenKind::Name, "x")]);
    let mut automaton = Recorder::module();
    let tree = parse(&mut source, &mut automaton, StartRule::File).unwrap();
    assert_eq!(
        automaton.kinds(),
        vec![TokenKind::Name, TokenKind::Newline, TokenKind::EndMarker]
    );
    assert!(tree.last_child().unwrap().is_token(TokenKind::EndMarker));
    assert!(source.dedent_requests.is_empty());
}

#[test]
fn leading_end_marker_passes_through() {
    let mut source = Script::new(&[]);
    let mut automaton = Recorder::module();
    parse(&mut source, &mut automaton, StartRule::File).unwrap();
    assert_eq!(automaton.kinds(), vec![TokenKind::EndMarker]);
}

#[test]
fn open_blocks_are_closed_before_end_marker() {
    let mut source = Script::new(&[(TokenKind::Name, "x")]);
    source.depth = 2;
    let mut automaton = Recorder::module();
    parse(&mut source, &mut automaton, StartRule::File).unwrap();
    assert_eq!(source.dedent_requests, vec![2]);
    assert_eq!(
        automaton.kinds(),
        vec![
            TokenKind::Name,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Dedent,
            TokenKind::Newline,
            TokenKind::EndMarker,
        ]
    );
}

#[test]
fn implied_dedent_can_be_disabled() {
    let mut source = Script::new(&[(TokenKind::Name, "x")]);
    source.depth = 1;
    let mut automaton = Recorder::module();
    let mut options = ParseOptions::new(ParseFlags::DONT_IMPLY_DEDENT);
    parse_tokens(&mut source, &mut automaton, StartRule::File, &mut options, None).unwrap();
    assert!(source.dedent_requests.is_empty());
    assert_eq!(
        automaton.kinds(),
        vec![TokenKind::Name, TokenKind::Newline, TokenKind::EndMarker]
    );
}

// === Tokens handed over ===

#[test]
fn tokens_carry_text_line_and_column() {
    let mut source = Script::new(&[(TokenKind::Name, "spam"), (TokenKind::Equal, "=")]);
    let mut automaton = Recorder::module();
    parse(&mut source, &mut automaton, StartRule::File).unwrap();
    assert_eq!(automaton.seen[0], Token::new(TokenKind::Name, "spam", 1, Some(0)));
    assert_eq!(automaton.seen[1], Token::new(TokenKind::Equal, "=", 1, Some(5)));
    assert_eq!(automaton.seen[2], Token::new(TokenKind::Newline, "", 1, None));
}

#[test]
fn column_unknown_before_line_start() {
    let mut source = Script::new(&[(TokenKind::String, "'a'")]);
    if let Some(Ok(lexeme)) = source.lexemes.front_mut() {
        lexeme.line_start = 2;
    }
    let mut automaton = Recorder::module();
    parse(&mut source, &mut automaton, StartRule::File).unwrap();
    assert_eq!(automaton.seen[0].col, None);
}

// === Pragmas ===

#[test]
fn pragmas_skip_the_automaton_and_land_on_end_marker() {
    let mut source = Script::new(&[
        (TokenKind::Name, "x"),
        (TokenKind::TypeIgnore, "[a]"),
        (TokenKind::Newline, ""),
        (TokenKind::TypeIgnore, ""),
    ]);
    if let Some(Ok(lexeme)) = source.lexemes.get_mut(3) {
        lexeme.line = 2;
    }
    let mut automaton = Recorder::module();
    let tree = parse(&mut source, &mut automaton, StartRule::File).unwrap();
    assert!(!automaton.kinds().contains(&TokenKind::TypeIgnore));
    let end = tree.last_child().unwrap();
    let attached: Vec<_> = end.children.iter().map(|n| (n.line, n.text().unwrap())).collect();
    assert_eq!(attached, vec![(1, "[a]"), (2, "")]);
}

#[test]
fn pragmas_dropped_outside_file_input() {
    let mut source = Script::new(&[(TokenKind::Name, "x"), (TokenKind::TypeIgnore, "")]);
    let mut automaton = Recorder::new(Symbol::EvalInput, TokenKind::EndMarker);
    let tree = parse(&mut source, &mut automaton, StartRule::Eval).unwrap();
    assert!(tree.last_child().unwrap().children.is_empty());
}

#[test]
fn annotation_growth_failure_is_out_of_memory() {
    let mut source = Script::new(&[
        (TokenKind::TypeIgnore, "a"),
        (TokenKind::TypeIgnore, "b"),
    ]);
    let mut automaton = Recorder::module();
    let mut options = ParseOptions {
        annotation_capacity: 1,
        annotation_limit: Some(1),
        ..ParseOptions::default()
    };
    let diag =
        parse_tokens(&mut source, &mut automaton, StartRule::File, &mut options, None).unwrap_err();
    assert_eq!(diag.kind, ErrorKind::OutOfMemory);
    assert!(automaton.seen.is_empty());
}

// === Failures ===

#[test]
fn rejection_records_token_expected_and_position() {
    let mut source = Script::new(&[(TokenKind::Name, "x"), (TokenKind::RPar, ")")]);
    let mut automaton = Recorder::module().rejecting(
        TokenKind::RPar,
        Reject::Syntax {
            expected: Some(TokenKind::Colon),
        },
    );
    let diag = parse(&mut source, &mut automaton, StartRule::File).unwrap_err();
    assert_eq!(
        diag,
        Diagnostic {
            kind: ErrorKind::SyntaxError,
            filename: Arc::from(STRING_FILENAME),
            line: 1,
            offset: 4,
            text: Some("x ) ".to_owned()),
            token: Some(TokenKind::RPar),
            expected: Some(TokenKind::Colon),
        }
    );
}

#[test]
fn exhausted_source_reports_end_of_file() {
    let mut source = Script::new(&[(TokenKind::LPar, "(")]);
    source.exhausted = true;
    let mut automaton = Recorder::module().rejecting(TokenKind::Newline, Reject::Syntax { expected: None });
    let diag = parse(&mut source, &mut automaton, StartRule::File).unwrap_err();
    assert_eq!(diag.kind, ErrorKind::EndOfFile);
    assert_eq!(diag.token, Some(TokenKind::Newline));
}

#[test]
fn finished_source_keeps_syntax_error() {
    let mut source = Script::new(&[(TokenKind::LPar, "(")]);
    let mut automaton = Recorder::module().rejecting(TokenKind::Newline, Reject::Syntax { expected: None });
    let diag = parse(&mut source, &mut automaton, StartRule::File).unwrap_err();
    assert_eq!(diag.kind, ErrorKind::SyntaxError);
}

#[test]
fn lexical_errors_pass_through() {
    let mut source = Script::new(&[(TokenKind::Name, "x")]).then_fail(LexErrorKind::TabSpace);
    let mut automaton = Recorder::module();
    let diag = parse(&mut source, &mut automaton, StartRule::File).unwrap_err();
    assert_eq!(diag.kind, ErrorKind::TabSpace);
    assert_eq!(diag.token, None);
    assert_eq!(automaton.kinds(), vec![TokenKind::Name]);
}

#[test]
fn automaton_out_of_memory() {
    let mut source = Script::new(&[(TokenKind::Name, "x")]);
    let mut automaton = Recorder::module().rejecting(TokenKind::Name, Reject::OutOfMemory);
    let diag = parse(&mut source, &mut automaton, StartRule::File).unwrap_err();
    assert_eq!(diag.kind, ErrorKind::OutOfMemory);
}

#[test]
fn filename_is_recorded() {
    let mut source = Script::new(&[]).then_fail(LexErrorKind::BadToken);
    let mut automaton = Recorder::module();
    let name: Arc<str> = Arc::from("spam.py");
    let diag = parse_tokens(
        &mut source,
        &mut automaton,
        StartRule::File,
        &mut ParseOptions::default(),
        Some(Arc::clone(&name)),
    )
    .unwrap_err();
    assert!(Arc::ptr_eq(&diag.filename, &name));
    assert_eq!(diag.text, None);
}

// === Not-equal spelling and future flags ===

fn not_equal(spelling: &str, future: FutureFlags) -> (Result<Node, Diagnostic>, Vec<TokenKind>) {
    let mut source = Script::new(&[
        (TokenKind::Number, "1"),
        (TokenKind::NotEqual, spelling),
        (TokenKind::Number, "2"),
    ]);
    let mut automaton = Recorder::module();
    let mut options = ParseOptions::default().with_future(future);
    let result = parse_tokens(&mut source, &mut automaton, StartRule::File, &mut options, None);
    (result, automaton.kinds())
}

#[test]
fn bang_equal_without_future_import() {
    assert!(not_equal("!=", FutureFlags::empty()).0.is_ok());
    let (result, seen) = not_equal("<>", FutureFlags::empty());
    let diag = result.unwrap_err();
    assert_eq!((diag.kind, diag.expected), (ErrorKind::SyntaxError, None));
    assert_eq!(seen, vec![TokenKind::Number]);
}

#[test]
fn diamond_with_future_import() {
    assert!(not_equal("<>", FutureFlags::BARRY_AS_FLUFL).0.is_ok());
    let diag = not_equal("!=", FutureFlags::BARRY_AS_FLUFL).0.unwrap_err();
    assert_eq!(diag.kind, ErrorKind::SyntaxError);
    assert_eq!(diag.expected, Some(TokenKind::NotEqual));
}

#[test]
fn future_flags_written_back_on_failure() {
    let mut source = Script::new(&[(TokenKind::Name, "flufl"), (TokenKind::RPar, ")")]);
    let mut automaton =
        Recorder::module().rejecting(TokenKind::RPar, Reject::Syntax { expected: None });
    automaton.flufl_name = Some("flufl");
    let mut options = ParseOptions::default();
    assert!(parse_tokens(&mut source, &mut automaton, StartRule::File, &mut options, None).is_err());
    assert_eq!(options.future, FutureFlags::BARRY_AS_FLUFL);
}

// === Post-processing ===

#[test]
fn single_statement_with_trailing_code() {
    let mut source = Script::new(&[(TokenKind::Name, "x"), (TokenKind::Newline, "")]);
    source.remaining = "y = 2\n".to_owned();
    let mut automaton = Recorder::new(Symbol::SingleInput, TokenKind::Newline);
    let diag = parse(&mut source, &mut automaton, StartRule::Single).unwrap_err();
    assert_eq!(diag.kind, ErrorKind::MalformedSingleStatement);
    assert_eq!(diag.line, 1);
}

#[test]
fn single_statement_with_trailing_comment() {
    let mut source = Script::new(&[(TokenKind::Name, "x"), (TokenKind::Newline, "")]);
    source.remaining = "   # done\n\n".to_owned();
    let mut automaton = Recorder::new(Symbol::SingleInput, TokenKind::Newline);
    assert!(parse(&mut source, &mut automaton, StartRule::Single).is_ok());
}

#[test]
fn reported_encoding_wraps_tree() {
    let mut plain_source = Script::new(&[(TokenKind::Name, "x")]);
    let plain = parse(&mut plain_source, &mut Recorder::module(), StartRule::File).unwrap();

    let mut source = Script::new(&[(TokenKind::Name, "x")]);
    source.encoding = Some("utf-8".to_owned());
    let tree = parse(&mut source, &mut Recorder::module(), StartRule::File).unwrap();
    assert!(tree.is_symbol(Symbol::EncodingDecl));
    assert_eq!(tree.text(), Some("utf-8"));
    assert_eq!(tree.children, vec![plain]);
}

#[test]
fn module_not_ending_in_end_marker() {
    let mut source = Script::new(&[(TokenKind::Name, "x"), (TokenKind::Newline, "")]);
    let mut automaton = Recorder::new(Symbol::FileInput, TokenKind::Newline);
    let diag = parse(&mut source, &mut automaton, StartRule::File).unwrap_err();
    assert_eq!(diag.kind, ErrorKind::InternalInvariantViolation);
}
