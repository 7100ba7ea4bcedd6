//! Property tests over generated programs: pragma order and repeatability.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use knot_ir::Node;
use knot_parse::{parse_string, ErrorKind, ParseOptions, StartRule};
use proptest::prelude::*;

static STATEMENTS: &[&str] = &[
    "x = 1",
    "y = x + 2 * z",
    "f(a, b=1)",
    "pass",
    "del q[0]",
    "s += [i for i in r if i]",
    "if a:\n    b = 1",
    "for i in r:\n    s += i",
    "def g(p):\n    return p",
];

static TAGS: &[&str] = &["", "[attr]", "[a, b]", " because"];

/// Source text and the `(line, tag)` pragmas it holds, in order.
fn program(
    lines: &[(&'static str, Option<&'static str>)],
    trailing_newline: bool,
) -> (String, Vec<(u32, String)>) {
    let mut src = String::new();
    let mut pragmas = Vec::new();
    let mut line = 1;
    for (index, &(statement, tag)) in lines.iter().enumerate() {
        src.push_str(statement);
        let last_line = line + u32::try_from(statement.matches('\n').count()).unwrap();
        if let Some(tag) = tag {
            src.push_str("  # type: ignore");
            src.push_str(tag);
            pragmas.push((last_line, tag.to_owned()));
        }
        if trailing_newline || index + 1 < lines.len() {
            src.push('\n');
        }
        line = last_line + 1;
    }
    (src, pragmas)
}

fn statements() -> impl Strategy<Value = Vec<(&'static str, Option<&'static str>)>> {
    prop::collection::vec(
        (
            prop::sample::select(STATEMENTS),
            prop::option::of(prop::sample::select(TAGS)),
        ),
        0..12,
    )
}

fn attached(tree: &Node) -> Vec<(u32, String)> {
    tree.last_child()
        .unwrap()
        .children
        .iter()
        .map(|n| (n.line, n.text().unwrap_or_default().to_owned()))
        .collect()
}

fn parse(src: &str, start: StartRule) -> Result<Node, knot_parse::Diagnostic> {
    parse_string(src, start, &mut ParseOptions::default())
}

proptest! {
    #[test]
    fn pragmas_attach_in_source_order(lines in statements(), trailing in any::<bool>()) {
        let (src, expected) = program(&lines, trailing);
        let tree = parse(&src, StartRule::File).unwrap();
        prop_assert_eq!(attached(&tree), expected);
    }

    #[test]
    fn parsing_is_repeatable(lines in statements(), trailing in any::<bool>()) {
        let (src, _) = program(&lines, trailing);
        prop_assert_eq!(parse(&src, StartRule::File), parse(&src, StartRule::File));
    }

    #[test]
    fn failures_are_repeatable(lines in statements()) {
        let (mut src, _) = program(&lines, true);
        src.push_str("x = )\n");
        let first = parse(&src, StartRule::File).unwrap_err();
        prop_assert_eq!(first.kind, ErrorKind::SyntaxError);
        let second = parse(&src, StartRule::File).unwrap_err();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn single_mode_takes_one_simple_statement(
        first in prop::sample::select(&STATEMENTS[..6]),
        second in prop::sample::select(&STATEMENTS[..6]),
    ) {
        let one = format!("{first}\n");
        prop_assert!(parse(&one, StartRule::Single).is_ok());
        let two = format!("{first}\n{second}\n");
        let diag = parse(&two, StartRule::Single).unwrap_err();
        prop_assert_eq!(diag.kind, ErrorKind::MalformedSingleStatement);
    }
}
