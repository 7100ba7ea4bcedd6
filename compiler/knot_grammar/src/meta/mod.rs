//! Reader for the grammar notation.
//!
//! ```text
//! # comment
//! rule: alternative | alternative
//!     continued on an indented line
//! ```
//!
//! An alternative is a sequence of items. Items are rule or token names,
//! quoted keywords and operators, `( ... )` groups, `[ ... ]` optional
//! parts, and any of those but the last followed by `*` or `+`.

use logos::Logos;

use crate::GrammarError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n]+|#[^\n]*)")]
enum MetaToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,
    #[regex(r"'[^'\n]+'")]
    Literal,
    #[token(":")]
    Colon,
    #[token("|")]
    Bar,
    #[token("(")]
    LPar,
    #[token(")")]
    RPar,
    #[token("[")]
    LSqb,
    #[token("]")]
    RSqb,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
}

/// Right-hand side of a rule.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) enum Rhs {
    Alt(Vec<Rhs>),
    Seq(Vec<Rhs>),
    Opt(Box<Rhs>),
    Star(Box<Rhs>),
    Plus(Box<Rhs>),
    Name(String),
    /// Quoted text without its quotes.
    Literal(String),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct Rule {
    pub name: String,
    pub rhs: Rhs,
    /// 1-based line the rule starts on.
    pub line: usize,
}

/// Split `text` into rules and read each one.
pub(crate) fn parse_rules(text: &str) -> Result<Vec<Rule>, GrammarError> {
    let mut rules = Vec::new();
    let mut current: Option<(usize, String)> = None;
    for (index, line) in text.lines().enumerate() {
        let starts_rule = line.starts_with(|c: char| !c.is_whitespace() && c != '#');
        if starts_rule {
            if let Some((at, body)) = current.take() {
                rules.push(parse_rule(&body, at)?);
            }
            current = Some((index + 1, line.to_owned()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push('\n');
            body.push_str(line);
        }
    }
    if let Some((at, body)) = current {
        rules.push(parse_rule(&body, at)?);
    }
    Ok(rules)
}

fn parse_rule(text: &str, line: usize) -> Result<Rule, GrammarError> {
    let mut tokens = Vec::new();
    let mut lex = MetaToken::lexer(text);
    while let Some(token) = lex.next() {
        let Ok(token) = token else {
            return Err(syntax(line, format!("unexpected `{}`", lex.slice())));
        };
        tokens.push((token, lex.slice()));
    }
    let mut reader = RuleReader {
        tokens,
        pos: 0,
        line,
    };
    let name = reader.expect(MetaToken::Name, "a rule name")?.to_owned();
    reader.expect(MetaToken::Colon, "':'")?;
    let rhs = reader.alternatives()?;
    if let Some(&(_, text)) = reader.tokens.get(reader.pos) {
        return Err(syntax(line, format!("unexpected `{text}`")));
    }
    Ok(Rule { name, rhs, line })
}

fn syntax(line: usize, message: String) -> GrammarError {
    GrammarError::Syntax { line, message }
}

struct RuleReader<'a> {
    tokens: Vec<(MetaToken, &'a str)>,
    pos: usize,
    line: usize,
}

impl<'a> RuleReader<'a> {
    fn peek(&self) -> Option<MetaToken> {
        self.tokens.get(self.pos).map(|&(token, _)| token)
    }

    fn bump(&mut self) -> Option<(MetaToken, &'a str)> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn expect(&mut self, want: MetaToken, what: &str) -> Result<&'a str, GrammarError> {
        match self.bump() {
            Some((token, text)) if token == want => Ok(text),
            Some((_, text)) => Err(syntax(self.line, format!("expected {what}, found `{text}`"))),
            None => Err(syntax(self.line, format!("expected {what} at end of rule"))),
        }
    }

    fn alternatives(&mut self) -> Result<Rhs, GrammarError> {
        let mut alts = vec![self.sequence()?];
        while self.peek() == Some(MetaToken::Bar) {
            self.pos += 1;
            alts.push(self.sequence()?);
        }
        Ok(if alts.len() == 1 {
            alts.swap_remove(0)
        } else {
            Rhs::Alt(alts)
        })
    }

    fn sequence(&mut self) -> Result<Rhs, GrammarError> {
        let mut items = Vec::new();
        while matches!(
            self.peek(),
            Some(MetaToken::Name | MetaToken::Literal | MetaToken::LPar | MetaToken::LSqb)
        ) {
            items.push(self.item()?);
        }
        match items.len() {
            0 => Err(syntax(self.line, "empty alternative".to_owned())),
            1 => Ok(items.swap_remove(0)),
            _ => Ok(Rhs::Seq(items)),
        }
    }

    fn item(&mut self) -> Result<Rhs, GrammarError> {
        if self.peek() == Some(MetaToken::LSqb) {
            self.pos += 1;
            let inner = self.alternatives()?;
            self.expect(MetaToken::RSqb, "']'")?;
            return Ok(Rhs::Opt(Box::new(inner)));
        }
        let atom = self.atom()?;
        Ok(match self.peek() {
            Some(MetaToken::Star) => {
                self.pos += 1;
                Rhs::Star(Box::new(atom))
            }
            Some(MetaToken::Plus) => {
                self.pos += 1;
                Rhs::Plus(Box::new(atom))
            }
            _ => atom,
        })
    }

    fn atom(&mut self) -> Result<Rhs, GrammarError> {
        match self.bump() {
            Some((MetaToken::LPar, _)) => {
                let inner = self.alternatives()?;
                self.expect(MetaToken::RPar, "')'")?;
                Ok(inner)
            }
            Some((MetaToken::Name, text)) => Ok(Rhs::Name(text.to_owned())),
            Some((MetaToken::Literal, text)) => {
                Ok(Rhs::Literal(text.trim_matches('\'').to_owned()))
            }
            Some((_, text)) => Err(syntax(self.line, format!("unexpected `{text}`"))),
            None => Err(syntax(self.line, "unexpected end of rule".to_owned())),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
