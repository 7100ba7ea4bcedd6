//! `knot` subcommands.

mod options;

use std::io::{self, Read, Write};
use std::path::Path;

use knot_diagnostic::emitter::DiagnosticEmitter;
use knot_diagnostic::{Diagnostic, ErrorKind};
use knot_grammar::python;
use knot_ir::{Node, TokenKind, TokenSource};
use knot_lexer::{Lexer, SourceText};
use knot_parse::{parse_file, parse_reader, ParseFlags, ParseOptions, ReadError};
use tracing::debug;

pub use options::{CommandOptions, OptionError};

/// Path that means standard input.
pub const STDIN_PATH: &str = "-";

/// What a command ended with, as a process exit code.
pub type ExitCode = i32;

fn parse_input(options: &CommandOptions) -> Result<Node, ReadError> {
    let mut parse_options = ParseOptions::new(options.flags);
    let encoding = options.encoding.as_deref();
    if options.path == STDIN_PATH {
        let stdin = io::stdin().lock();
        parse_reader(stdin, Some("<stdin>"), encoding, options.start, &mut parse_options)
    } else {
        parse_file(Path::new(&options.path), encoding, options.start, &mut parse_options)
    }
}

fn read_input(path: &str) -> io::Result<Vec<u8>> {
    if path == STDIN_PATH {
        let mut bytes = Vec::new();
        io::stdin().lock().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(path)
    }
}

fn report_read_error(err: &ReadError, errors: &mut impl DiagnosticEmitter) -> ExitCode {
    match err {
        ReadError::Parse(diag) => {
            errors.emit(diag);
            errors.flush();
        }
        ReadError::Io { .. } => eprintln!("error: {err}"),
    }
    1
}

/// `knot parse`: print the syntax tree.
pub fn parse(
    options: &CommandOptions,
    out: &mut impl Write,
    errors: &mut impl DiagnosticEmitter,
) -> ExitCode {
    match parse_input(options) {
        Ok(tree) => {
            let _ = out.write_all(tree.render().as_bytes());
            0
        }
        Err(err) => report_read_error(&err, errors),
    }
}

/// `knot check`: print `ok`, or the diagnostic.
pub fn check(
    options: &CommandOptions,
    out: &mut impl Write,
    errors: &mut impl DiagnosticEmitter,
) -> ExitCode {
    match parse_input(options) {
        Ok(tree) => {
            debug!(nodes = tree.node_count(), "check passed");
            let _ = writeln!(out, "ok");
            0
        }
        Err(err) => report_read_error(&err, errors),
    }
}

/// `knot tokens`: print the raw token stream, one token per line.
///
/// No terminator or dedents are synthesized; this is what the lexer
/// produces on its own.
pub fn tokens(
    options: &CommandOptions,
    out: &mut impl Write,
    errors: &mut impl DiagnosticEmitter,
) -> ExitCode {
    let bytes = match read_input(&options.path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("error: cannot read {}: {err}", options.path);
            return 1;
        }
    };
    let filename = Some(options.display_name().into());
    let mode = ParseOptions::new(options.flags).decode_mode();
    let source = match SourceText::decode(&bytes, mode, options.encoding.as_deref()) {
        Ok(source) => source,
        Err(err) => {
            debug!(%err, "decode failed");
            errors.emit(&Diagnostic::with_kind(ErrorKind::DecodeFailure, filename));
            errors.flush();
            return 1;
        }
    };

    let mut lexer =
        Lexer::new(source).async_always(options.flags.contains(ParseFlags::ASYNC_ALWAYS));
    loop {
        let lexeme = match lexer.next_token() {
            Ok(lexeme) => lexeme,
            Err(kind) => {
                let diag = Diagnostic {
                    line: lexer.line(),
                    offset: lexer.scan_offset(),
                    text: lexer.buffered_input().map(str::to_owned),
                    ..Diagnostic::with_kind(kind.into(), filename)
                };
                errors.emit(&diag);
                errors.flush();
                return 1;
            }
        };
        let text = lexeme.span.map(|span| lexer.text(span)).unwrap_or_default();
        let col = lexeme.column().map_or_else(|| "-".to_owned(), |col| col.to_string());
        let _ = writeln!(out, "{}:{col} {} {text:?}", lexeme.line, lexeme.kind.name());
        if lexeme.kind == TokenKind::EndMarker {
            return 0;
        }
    }
}

/// `knot grammar`: print the compiled grammar tables.
pub fn grammar(out: &mut impl Write) -> ExitCode {
    match python() {
        Ok(grammar) => {
            let _ = out.write_all(grammar.describe().as_bytes());
            0
        }
        Err(err) => {
            eprintln!("error: grammar failed to build: {err}");
            1
        }
    }
}
