//! Grammar labels: what an arc in a rule's automaton can match.

use std::fmt;

use knot_ir::{Symbol, TokenKind};
use rustc_hash::FxHashMap;

use crate::GrammarError;

/// Something a DFA arc can consume.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Label {
    /// Any token of this kind.
    Token(TokenKind),
    /// A NAME token with exactly this text.
    Keyword(Box<str>),
    /// A complete nonterminal.
    Rule(Symbol),
}

impl Label {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Label::Rule(_))
    }

    /// Token kind a terminal label matches. Keywords are NAME tokens.
    pub fn token_kind(&self) -> Option<TokenKind> {
        match self {
            Label::Token(kind) => Some(*kind),
            Label::Keyword(_) => Some(TokenKind::Name),
            Label::Rule(_) => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Token(kind) => f.write_str(&kind.display_name()),
            Label::Keyword(text) => write!(f, "'{text}'"),
            Label::Rule(sym) => f.write_str(sym.name()),
        }
    }
}

/// Index of a label in a grammar's label table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct LabelId(u16);

impl LabelId {
    #[inline]
    pub(crate) fn from_raw(raw: u16) -> Self {
        LabelId(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Interned labels of one grammar.
#[derive(Clone, Debug, Default)]
pub(crate) struct LabelTable {
    labels: Vec<Label>,
    index: FxHashMap<Label, LabelId>,
}

impl LabelTable {
    pub(crate) fn intern(&mut self, label: Label) -> Result<LabelId, GrammarError> {
        if let Some(&id) = self.index.get(&label) {
            return Ok(id);
        }
        let id = u16::try_from(self.labels.len())
            .map(LabelId)
            .map_err(|_| GrammarError::TooManyStates(label.to_string()))?;
        self.labels.push(label.clone());
        self.index.insert(label, id);
        Ok(id)
    }

    /// Label for a name or quoted literal as written in a rule.
    pub(crate) fn resolve(&mut self, item: &str, quoted: bool) -> Result<LabelId, GrammarError> {
        let label = if quoted {
            if item.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                Label::Keyword(item.into())
            } else {
                let kind = TokenKind::from_operator(item)
                    .ok_or_else(|| GrammarError::UnknownOperator(item.to_owned()))?;
                Label::Token(kind)
            }
        } else if let Some(sym) = Symbol::from_name(item) {
            Label::Rule(sym)
        } else if let Some(kind) = TokenKind::from_name(item) {
            Label::Token(kind)
        } else {
            return Err(GrammarError::UnknownName(item.to_owned()));
        };
        self.intern(label)
    }

    pub(crate) fn into_vec(self) -> Vec<Label> {
        self.labels
    }
}
