//! Diagnostics for a failed parse.
//!
//! A parse attempt that does not produce a tree produces exactly one
//! [`Diagnostic`]: what kind of failure stopped it, where, the text around
//! the failure, and which token was seen versus expected. Nothing in the
//! driver formats or prints; callers pick an [`emitter`] for that.

mod diagnostic;
pub mod emitter;

pub use diagnostic::{Diagnostic, ErrorKind, STRING_FILENAME};
