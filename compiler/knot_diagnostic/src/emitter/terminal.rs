//! Caret-style terminal output.
//!
//! ```text
//!   File "<string>", line 1
//!     x = )
//!         ^
//! SyntaxError: invalid syntax
//! ```

use std::io::{self, Write};

use crate::Diagnostic;

use super::DiagnosticEmitter;

mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const BOLD: &str = "\x1b[1m";
    pub const CARET: &str = "\x1b[1;32m"; // Bold green
    pub const RESET: &str = "\x1b[0m";
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Writes diagnostics as a location header, the offending line, a caret and
/// the message.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }
}

impl TerminalEmitter<io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

/// Whitespace that lines a caret up under `prefix`, keeping tabs so the
/// terminal expands both lines the same way.
fn caret_padding(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect()
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let _ = write!(self.writer, "  File \"");
        self.write_colored(&diagnostic.filename, colors::BOLD);
        let _ = writeln!(self.writer, "\", line {}", diagnostic.line);

        if let Some((line, offset)) = diagnostic.error_line() {
            let trimmed = line.trim_start();
            let indent = line.len() - trimmed.len();
            let _ = writeln!(self.writer, "    {}", trimmed.trim_end());
            let end = offset.saturating_sub(indent).min(trimmed.len());
            // The caret sits under the last character before the scan position.
            let mut before = trimmed.get(..end).unwrap_or_default().chars();
            before.next_back();
            let _ = write!(self.writer, "    {}", caret_padding(before.as_str()));
            self.write_colored("^", colors::CARET);
            let _ = writeln!(self.writer);
        }

        self.write_colored(diagnostic.category(), colors::ERROR);
        let _ = writeln!(self.writer, ": {}", diagnostic.message());
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
