use pretty_assertions::assert_eq;

use super::*;

fn name(s: &str) -> Rhs {
    Rhs::Name(s.to_owned())
}

fn lit(s: &str) -> Rhs {
    Rhs::Literal(s.to_owned())
}

#[test]
fn sequence_alternatives_and_repetition() {
    let rules = parse_rules("stmt: NAME ('=' NAME)* | 'pass'\n").unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "stmt");
    assert_eq!(
        rules[0].rhs,
        Rhs::Alt(vec![
            Rhs::Seq(vec![
                name("NAME"),
                Rhs::Star(Box::new(Rhs::Seq(vec![lit("="), name("NAME")]))),
            ]),
            lit("pass"),
        ])
    );
}

#[test]
fn optional_and_plus() {
    let rules = parse_rules("atom: STRING+ ['(' ')']\n").unwrap();
    assert_eq!(
        rules[0].rhs,
        Rhs::Seq(vec![
            Rhs::Plus(Box::new(name("STRING"))),
            Rhs::Opt(Box::new(Rhs::Seq(vec![lit("("), lit(")")]))),
        ])
    );
}

#[test]
fn indented_lines_continue_a_rule() {
    let text = "# header\n\nstmt: NAME\n    | NUMBER\nexpr: NAME\n";
    let rules = parse_rules(text).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].line, 3);
    assert_eq!(rules[0].rhs, Rhs::Alt(vec![name("NAME"), name("NUMBER")]));
    assert_eq!(rules[1].line, 5);
}

#[test]
fn missing_colon() {
    assert_eq!(
        parse_rules("stmt NAME\n"),
        Err(GrammarError::Syntax {
            line: 1,
            message: "expected ':', found `NAME`".to_owned(),
        })
    );
}

#[test]
fn unclosed_group() {
    let err = parse_rules("x: NAME\nstmt: (NAME\n").unwrap_err();
    assert_eq!(
        err,
        GrammarError::Syntax {
            line: 2,
            message: "expected ')' at end of rule".to_owned(),
        }
    );
}

#[test]
fn empty_alternative() {
    assert!(matches!(
        parse_rules("stmt: NAME |\n"),
        Err(GrammarError::Syntax { line: 1, .. })
    ));
}
