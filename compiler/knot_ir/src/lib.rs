//! Shared vocabulary of the knot parser.
//!
//! - [`Span`] for byte ranges in decoded source
//! - [`TokenKind`] and [`Token`] for the terminal alphabet
//! - [`Symbol`] for grammar nonterminals
//! - [`Node`] for the concrete syntax tree
//! - [`TokenSource`] and [`Automaton`], the seams between the driver and
//!   its lexer and grammar collaborators

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod cst;
mod span;
mod symbol;
mod token;
mod traits;

pub use cst::{Node, NodeKind};
pub use span::{Span, SpanError};
pub use symbol::Symbol;
pub use token::{Token, TokenKind};
pub use traits::{
    Automaton, FutureFlags, LexErrorKind, Lexeme, Reject, Step, StopReason, TokenSource,
};
