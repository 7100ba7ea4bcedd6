//! knot command-line front end.

use std::io::{self, IsTerminal};

use knot_diagnostic::emitter::TerminalEmitter;
use knotc::commands::{self, CommandOptions, ExitCode};
use knotc::init_tracing;

fn print_usage() {
    eprintln!("Usage: knot <command> [options] <file|->");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  parse     Print the concrete syntax tree");
    eprintln!("  check     Print `ok` or the syntax error");
    eprintln!("  tokens    Print the token stream");
    eprintln!("  grammar   Print the compiled grammar tables");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --single             Parse one interactive statement");
    eprintln!("  --eval               Parse one expression list");
    eprintln!("  --no-implied-dedent  Do not close open blocks at end of input");
    eprintln!("  --ignore-cookie      Read input as UTF-8, ignoring coding cookies");
    eprintln!("  --async-always       Treat async and await as keywords everywhere");
    eprintln!("  --encoding=<name>    Encoding the input is known to be in");
    eprintln!("  --color=<mode>       auto, always or never");
    eprintln!("  --trace-tree         Indented span output (with RUST_LOG)");
}

fn run_with_input(
    command: fn(&CommandOptions, &mut io::StdoutLock<'static>, &mut TerminalEmitter<io::Stderr>) -> ExitCode,
    args: &[String],
) -> ExitCode {
    let options = match CommandOptions::parse(args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            return 2;
        }
    };
    init_tracing(options.trace_tree);
    let mut errors = TerminalEmitter::stderr(options.color, io::stderr().is_terminal());
    command(&options, &mut io::stdout().lock(), &mut errors)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_usage();
        std::process::exit(2);
    };
    let rest = &args[2..];

    let code = match command.as_str() {
        "parse" => run_with_input(commands::parse, rest),
        "check" => run_with_input(commands::check, rest),
        "tokens" => run_with_input(commands::tokens, rest),
        "grammar" => {
            init_tracing(false);
            commands::grammar(&mut io::stdout().lock())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        _ => {
            eprintln!("error: unknown command `{command}`");
            print_usage();
            2
        }
    };
    std::process::exit(code);
}
