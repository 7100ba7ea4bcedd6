//! Parse driver for the knot parser.
//!
//! The driver connects a [`TokenSource`](knot_ir::TokenSource) to a grammar
//! [`Automaton`](knot_ir::Automaton) and turns the token stream into a
//! concrete syntax tree or a [`Diagnostic`].
//!
//! # Layers
//!
//! - [`parse_tokens`]: the core loop over any source and automaton
//! - [`parse_string`], [`parse_bytes`], [`parse_file`], [`parse_reader`]:
//!   decode the input, build the reference lexer and grammar, and call the
//!   core loop
//!
//! # Example
//!
//! ```
//! use knot_parse::{parse_string, ParseOptions, StartRule};
//!
//! let mut options = ParseOptions::default();
//! let tree = parse_string("x = 1\n", StartRule::File, &mut options).unwrap();
//! assert_eq!(tree.symbol().map(|s| s.name()), Some("file_input"));
//! ```

mod annotations;
mod driver;
mod entry;
mod options;
mod postprocess;

pub use annotations::{AllocError, Annotation, AnnotationBuffer};
pub use driver::parse_tokens;
pub use entry::{
    parse_bytes, parse_file, parse_reader, parse_string, parse_string_with_filename, ReadError,
};
pub use knot_diagnostic::{Diagnostic, ErrorKind};
pub use options::{ParseFlags, ParseOptions, StartRule, DEFAULT_ANNOTATION_CAPACITY};
