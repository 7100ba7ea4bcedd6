//! Runtime tables: one DFA per nonterminal plus the label table.

use std::fmt::Write as _;

use knot_ir::{Symbol, TokenKind};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::label::{Label, LabelId};

/// What the automaton does when a terminal arrives in a state.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Action {
    /// Consume the token and move to `next`.
    Shift(u16),
    /// Move to `next` in this rule, then start `symbol` on the same token.
    Push { symbol: Symbol, next: u16 },
}

/// One DFA arc.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Arc {
    pub label: LabelId,
    pub next: u16,
}

#[derive(Clone, Debug)]
pub struct State {
    pub arcs: SmallVec<[Arc; 4]>,
    pub accepting: bool,
    /// Terminal label to action, with nonterminal arcs expanded through
    /// their first sets.
    pub(crate) accel: FxHashMap<LabelId, Action>,
}

impl State {
    #[inline]
    pub fn action(&self, label: LabelId) -> Option<Action> {
        self.accel.get(&label).copied()
    }

    /// Accepting with nowhere else to go: the rule is complete.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.accepting && self.arcs.is_empty()
    }

    /// Terminal labels this state can consume.
    pub fn admissible(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.accel.keys().copied()
    }
}

#[derive(Clone, Debug)]
pub struct Dfa {
    pub symbol: Symbol,
    pub states: Vec<State>,
    /// Terminal labels that can start this rule, sorted.
    pub first: Vec<LabelId>,
}

impl Dfa {
    #[inline]
    pub fn state(&self, index: u16) -> Option<&State> {
        self.states.get(usize::from(index))
    }
}

/// LL(1) tables for a set of rules.
#[derive(Clone, Debug)]
pub struct Grammar {
    pub(crate) labels: Vec<Label>,
    pub(crate) keywords: FxHashMap<Box<str>, LabelId>,
    pub(crate) tokens: FxHashMap<TokenKind, LabelId>,
    /// Indexed by `Symbol as usize`.
    pub(crate) dfas: Vec<Option<Dfa>>,
}

impl Grammar {
    pub fn dfa(&self, symbol: Symbol) -> Option<&Dfa> {
        self.dfas.get(symbol as usize).and_then(Option::as_ref)
    }

    pub fn dfas(&self) -> impl Iterator<Item = &Dfa> {
        self.dfas.iter().flatten()
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(id.index())
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Label a token of `kind` with `text` matches. A NAME whose text is a
    /// keyword matches the keyword, never the plain NAME label.
    pub fn classify(&self, kind: TokenKind, text: &str) -> Option<LabelId> {
        if kind == TokenKind::Name {
            if let Some(&id) = self.keywords.get(text) {
                return Some(id);
            }
        }
        self.tokens.get(&kind).copied()
    }

    /// Token kind of the only terminal `state` admits, if it admits exactly
    /// one.
    pub fn single_expected(&self, state: &State) -> Option<TokenKind> {
        let mut admissible = state.admissible();
        let only = admissible.next()?;
        if admissible.next().is_some() {
            return None;
        }
        self.label(only).and_then(Label::token_kind)
    }

    /// Human-readable dump of every rule's automaton.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for dfa in self.dfas() {
            let first: Vec<String> = dfa
                .first
                .iter()
                .filter_map(|&id| self.label(id).map(ToString::to_string))
                .collect();
            let _ = writeln!(
                out,
                "{} ({} states) first: {}",
                dfa.symbol,
                dfa.states.len(),
                first.join(" ")
            );
            for (index, state) in dfa.states.iter().enumerate() {
                let _ = write!(out, "  {index}{}", if state.accepting { "*" } else { "" });
                for arc in &state.arcs {
                    if let Some(label) = self.label(arc.label) {
                        let _ = write!(out, " {label}->{}", arc.next);
                    }
                }
                out.push('\n');
            }
        }
        out
    }
}
