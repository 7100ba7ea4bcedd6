//! Diagnostic emitters.
//!
//! The driver never prints. Front ends pick an emitter and hand it the
//! [`Diagnostic`] a failed parse returned.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Something that can report diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn flush(&mut self);
}

/// Render `diagnostic` as plain text, the way [`TerminalEmitter`] prints it
/// without colors.
pub fn render(diagnostic: &Diagnostic) -> String {
    let mut out = Vec::new();
    let mut emitter = TerminalEmitter::with_color_mode(&mut out, ColorMode::Never, false);
    emitter.emit(diagnostic);
    String::from_utf8_lossy(&out).into_owned()
}
