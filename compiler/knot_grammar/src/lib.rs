//! LL(1) grammar tables and the pushdown automaton that runs them.
//!
//! [`Grammar::from_text`] reads rules in an EBNF notation and builds one
//! DFA per rule. [`Parser`] walks those DFAs with an explicit stack and
//! implements [`knot_ir::Automaton`], producing a concrete syntax tree.
//! [`python`] returns the tables for the bundled reference grammar.

mod build;
mod error;
mod grammar;
mod label;
mod meta;
mod parser;
mod python;

pub use error::GrammarError;
pub use grammar::{Action, Arc, Dfa, Grammar, State};
pub use label::{Label, LabelId};
pub use parser::{Parser, MAX_STACK_DEPTH};
pub use python::{python, PYTHON_GRAMMAR};
