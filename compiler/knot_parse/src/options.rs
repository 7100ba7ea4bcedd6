//! Per-parse configuration.

use bitflags::bitflags;
use knot_ir::{FutureFlags, Symbol};
use knot_lexer::DecodeMode;

bitflags! {
    /// Switches that change how one parse runs.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParseFlags: u32 {
        /// Skip encoding-cookie detection and read the input as UTF-8.
        const IGNORE_COOKIE = 1 << 0;
        /// `async` and `await` are keywords everywhere.
        const ASYNC_ALWAYS = 1 << 1;
        /// Do not close open blocks when the input ends mid-line.
        const DONT_IMPLY_DEDENT = 1 << 2;
    }
}

/// Entries the annotation buffer holds before it first grows.
pub const DEFAULT_ANNOTATION_CAPACITY: usize = 10;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ParseOptions {
    pub flags: ParseFlags,
    /// Seeded into the automaton before the first token and overwritten
    /// with the automaton's flags when the parse ends, successful or not.
    pub future: FutureFlags,
    pub annotation_capacity: usize,
    /// Largest capacity the annotation buffer may grow to. Growth past it
    /// fails as an allocation failure.
    pub annotation_limit: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            flags: ParseFlags::empty(),
            future: FutureFlags::empty(),
            annotation_capacity: DEFAULT_ANNOTATION_CAPACITY,
            annotation_limit: None,
        }
    }
}

impl ParseOptions {
    /// Default options with `flags` set.
    pub fn new(flags: ParseFlags) -> Self {
        ParseOptions {
            flags,
            ..ParseOptions::default()
        }
    }

    #[must_use]
    pub fn with_future(mut self, future: FutureFlags) -> Self {
        self.future = future;
        self
    }

    /// How the entry points decode input under these options.
    pub fn decode_mode(&self) -> DecodeMode {
        if self.flags.contains(ParseFlags::IGNORE_COOKIE) {
            DecodeMode::Raw
        } else {
            DecodeMode::Cookie
        }
    }
}

/// Which start symbol a parse is for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum StartRule {
    /// A module: any number of statements.
    #[default]
    File,
    /// One interactive statement.
    Single,
    /// One expression list.
    Eval,
}

impl StartRule {
    /// Grammar symbol the parse starts from.
    pub fn symbol(self) -> Symbol {
        match self {
            StartRule::File => Symbol::FileInput,
            StartRule::Single => Symbol::SingleInput,
            StartRule::Eval => Symbol::EvalInput,
        }
    }

    /// Name of that symbol, as used in logs.
    pub fn name(self) -> &'static str {
        self.symbol().name()
    }
}
