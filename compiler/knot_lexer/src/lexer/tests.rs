use knot_ir::TokenKind as K;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::indent::MAX_INDENT;
use crate::DecodeMode;

fn lexer(src: &str) -> Lexer {
    Lexer::new(SourceText::from_text(src, DecodeMode::Raw).unwrap())
}

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(&mut lexer(src))
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn texts(src: &str) -> Vec<String> {
    tokenize(&mut lexer(src))
        .unwrap()
        .into_iter()
        .map(|t| t.text)
        .collect()
}

fn error(src: &str) -> LexErrorKind {
    tokenize(&mut lexer(src)).unwrap_err()
}

// === Basic tokens ===

#[test]
fn simple_statement() {
    assert_eq!(
        kinds("x = 1\n"),
        vec![K::Name, K::Equal, K::Number, K::Newline, K::EndMarker]
    );
}

#[test]
fn empty_input_is_just_the_end_marker() {
    let mut lx = lexer("");
    assert_eq!(tokenize(&mut lx).unwrap().len(), 1);
    assert_eq!(lx.stop_reason(), StopReason::Finished);
    assert_eq!(lx.buffered_input(), None);
}

#[test]
fn operator_texts() {
    assert_eq!(texts("a <> b\n"), vec!["a", "<>", "b", "", ""]);
    assert_eq!(kinds("a <> b\n")[1], K::NotEqual);
}

#[test]
fn strings_with_prefixes() {
    assert_eq!(
        texts("s = 'a' \"b\" rb'c'\n"),
        vec!["s", "=", "'a'", "\"b\"", "rb'c'", "", ""]
    );
    assert_eq!(kinds("b = bar\n"), vec![K::Name, K::Equal, K::Name, K::Newline, K::EndMarker]);
}

#[test]
fn crlf_line_endings() {
    assert_eq!(
        kinds("x\r\ny\r\n"),
        vec![K::Name, K::Newline, K::Name, K::Newline, K::EndMarker]
    );
}

// === Layout ===

#[test]
fn indent_and_dedent() {
    assert_eq!(
        kinds("if x:\n    y\nz\n"),
        vec![
            K::Name, K::Name, K::Colon, K::Newline,
            K::Indent, K::Name, K::Newline,
            K::Dedent, K::Name, K::Newline,
            K::EndMarker,
        ]
    );
}

#[test]
fn end_of_input_at_line_start_closes_blocks() {
    let mut lx = lexer("if x:\n    y\n");
    let got: Vec<_> = tokenize(&mut lx).unwrap().into_iter().map(|t| t.kind).collect();
    assert_eq!(&got[got.len() - 2..], &[K::Dedent, K::EndMarker]);
    assert_eq!(lx.indentation_depth(), 0);
}

#[test]
fn end_of_input_mid_line_leaves_blocks_open() {
    let mut lx = lexer("if x:\n    y");
    let got: Vec<_> = tokenize(&mut lx).unwrap().into_iter().map(|t| t.kind).collect();
    assert_eq!(&got[got.len() - 2..], &[K::Name, K::EndMarker]);
    assert_eq!(lx.indentation_depth(), 1);
    assert_eq!(lx.stop_reason(), StopReason::Finished);
}

#[test]
fn blank_and_comment_lines_are_skipped() {
    let tokens = tokenize(&mut lexer("x\n\n   # note\n  \ny\n")).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![K::Name, K::Newline, K::Name, K::Newline, K::EndMarker]);
    assert_eq!(tokens[2].line, 5);
}

#[test]
fn brackets_join_lines() {
    assert_eq!(
        kinds("f(1,\n  2)\n"),
        vec![
            K::Name, K::LPar, K::Number, K::Comma, K::Number, K::RPar,
            K::Newline, K::EndMarker,
        ]
    );
}

#[test]
fn open_bracket_at_end_exhausts() {
    let mut lx = lexer("f(1,\n");
    let got: Vec<_> = tokenize(&mut lx).unwrap().into_iter().map(|t| t.kind).collect();
    assert_eq!(got, vec![K::Name, K::LPar, K::Number, K::Comma, K::EndMarker]);
    assert_eq!(lx.stop_reason(), StopReason::Exhausted);
}

#[test]
fn continuation_lines() {
    let tokens = tokenize(&mut lexer("x = 1 + \\\n  2\n")).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![K::Name, K::Equal, K::Number, K::Plus, K::Number, K::Newline, K::EndMarker]
    );
    assert_eq!((tokens[4].line, tokens[4].col), (2, Some(2)));
}

#[test]
fn continuation_into_end_of_input() {
    let mut lx = lexer("x = \\\n");
    assert_eq!(tokenize(&mut lx), Err(LexErrorKind::Eof));
    assert_eq!(lx.stop_reason(), StopReason::Exhausted);
}

#[test]
fn garbage_after_continuation() {
    let mut lx = lexer("x \\ y\n");
    assert_eq!(tokenize(&mut lx), Err(LexErrorKind::LineContinuation));
    assert_eq!(
        lx.stop_reason(),
        StopReason::Failed(LexErrorKind::LineContinuation)
    );
}

// === Strings ===

#[test]
fn triple_quoted_string_reports_its_first_line() {
    let tokens = tokenize(&mut lexer("x = '''a\nb'''\ny\n")).unwrap();
    assert_eq!(tokens[2].kind, K::String);
    assert_eq!(tokens[2].text, "'''a\nb'''");
    assert_eq!((tokens[2].line, tokens[2].col), (1, Some(4)));
    assert_eq!((tokens[3].kind, tokens[3].line, tokens[3].col), (K::Newline, 2, Some(4)));
    assert_eq!((tokens[4].line, tokens[4].col), (3, Some(0)));
}

#[test]
fn unterminated_strings() {
    assert_eq!(error("'abc\n"), LexErrorKind::EolInString);
    let mut lx = lexer("'''abc");
    assert_eq!(tokenize(&mut lx), Err(LexErrorKind::EofInTripleString));
    assert_eq!(
        lx.stop_reason(),
        StopReason::Failed(LexErrorKind::EofInTripleString)
    );
}

// === Pragmas ===

#[test]
fn trailing_type_ignore() {
    let tokens = tokenize(&mut lexer("x = 1  # type: ignore\n")).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![K::Name, K::Equal, K::Number, K::TypeIgnore, K::Newline, K::EndMarker]
    );
    assert_eq!(tokens[3].text, "");
    assert_eq!(tokens[3].line, 1);
}

#[test]
fn type_ignore_alone_on_its_line_takes_the_newline() {
    let tokens = tokenize(&mut lexer("# type: ignore[import]\nx\n")).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![K::TypeIgnore, K::Name, K::Newline, K::EndMarker]);
    assert_eq!(tokens[0].text, "[import]");
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn other_comments_vanish() {
    assert_eq!(
        kinds("x  # type: ignored\n"),
        vec![K::Name, K::Newline, K::EndMarker]
    );
}

// === Indentation errors ===

#[test]
fn dedent_to_unknown_level() {
    assert_eq!(error("if x:\n    y\n  z\n"), LexErrorKind::Dedent);
}

#[test]
fn inconsistent_tabs() {
    assert_eq!(error("if x:\n\ty\n        z\n"), LexErrorKind::TabSpace);
}

#[test]
fn nesting_too_deep() {
    let src: String = (0..=MAX_INDENT).map(|i| format!("{}x\n", " ".repeat(i))).collect();
    assert_eq!(error(&src), LexErrorKind::TooDeep);
}

#[test]
fn bad_character_is_sticky() {
    let mut lx = lexer("x = $\n");
    assert_eq!(tokenize(&mut lx), Err(LexErrorKind::BadToken));
    assert_eq!(lx.next_token(), Err(LexErrorKind::BadToken));
}

// === async / await ===

#[test]
fn async_keywords_inside_async_def_only() {
    assert_eq!(
        kinds("async def f():\n    await x\nawait\n"),
        vec![
            K::Async, K::Name, K::Name, K::LPar, K::RPar, K::Colon, K::Newline,
            K::Indent, K::Await, K::Name, K::Newline,
            K::Dedent, K::Name, K::Newline,
            K::EndMarker,
        ]
    );
    assert_eq!(
        kinds("async = 1\n"),
        vec![K::Name, K::Equal, K::Number, K::Newline, K::EndMarker]
    );
}

#[test]
fn async_always_makes_them_keywords() {
    let mut lx = lexer("await x\n").async_always(true);
    let got: Vec<_> = tokenize(&mut lx).unwrap().into_iter().map(|t| t.kind).collect();
    assert_eq!(got, vec![K::Await, K::Name, K::Newline, K::EndMarker]);
    assert_eq!(
        kinds("await x\n"),
        vec![K::Name, K::Name, K::Newline, K::EndMarker]
    );
}

// === Driver-facing state ===

#[test]
fn buffer_and_offset_track_scan_position() {
    let mut lx = lexer("x = 1\ny = )\n");
    for _ in 0..7 {
        lx.next_token().unwrap();
    }
    assert_eq!(lx.line(), 2);
    assert_eq!(lx.buffered_input(), Some("y = )\n"));
    assert_eq!(lx.scan_offset(), 5);
}

#[test]
fn newline_keeps_its_line_until_next_request() {
    let mut lx = lexer("x\ny\n");
    lx.next_token().unwrap();
    let newline = lx.next_token().unwrap();
    assert_eq!((newline.kind, newline.line), (K::Newline, 1));
    assert_eq!(lx.line(), 1);
    assert_eq!(lx.remaining_input(), "y\n");
    let y = lx.next_token().unwrap();
    assert_eq!((y.line, lx.line()), (2, 2));
}

#[test]
fn pending_dedents_come_before_end_marker() {
    let mut lx = lexer("if x:\n    y");
    tokenize(&mut lx).unwrap();
    assert_eq!(lx.indentation_depth(), 1);
    lx.set_pending_dedents(1);
    assert_eq!(lx.indentation_depth(), 0);
    assert_eq!(lx.next_token().unwrap().kind, K::Dedent);
    assert_eq!(lx.next_token().unwrap().kind, K::EndMarker);
}

#[test]
fn detected_encoding_is_exposed() {
    let src = SourceText::decode(b"# coding: latin-1\nx\n", DecodeMode::Cookie, None).unwrap();
    assert_eq!(Lexer::new(src).detected_encoding(), Some("iso-8859-1"));
    let plain = SourceText::decode(b"x\n", DecodeMode::Cookie, None).unwrap();
    assert_eq!(Lexer::new(plain).detected_encoding(), None);
}

proptest! {
    #[test]
    fn always_terminates_with_valid_spans(src in "[a-z0-9 \t\n()'#:=\\\\]{0,64}") {
        let mut lx = lexer(&src);
        let bound = 3 * src.len() + 2;
        let mut finished = false;
        for _ in 0..bound {
            match lx.next_token() {
                Ok(lexeme) => {
                    if let Some(span) = lexeme.span {
                        prop_assert!(src.get(span.to_range()).is_some());
                    }
                    if lexeme.kind == K::EndMarker {
                        finished = true;
                        break;
                    }
                }
                Err(_) => {
                    finished = true;
                    break;
                }
            }
        }
        prop_assert!(finished);
    }
}
