//! Reference lexical source for the knot parse driver.
//!
//! [`SourceText`] turns input bytes into text, honoring or ignoring
//! encoding cookies. [`Lexer`] walks that text and implements
//! [`knot_ir::TokenSource`]:
//!
//! - indentation becomes INDENT and DEDENT tokens, capped at
//!   a fixed nesting depth
//! - newlines inside brackets and after `\` are not tokens
//! - `# type: ignore` comments become TYPE_IGNORE tokens carrying their tag
//! - `async` and `await` are keywords inside `async def`, or everywhere on
//!   request

mod decode;
mod indent;
mod lexer;
mod pragma;
mod raw_token;

pub use decode::{normalize as normalize_encoding, DecodeError, DecodeMode, SourceText};
pub use lexer::{tokenize, Lexer};
