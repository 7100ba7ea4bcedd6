//! Command-line switches shared by the input-reading commands.

use knot_diagnostic::emitter::ColorMode;
use knot_parse::{ParseFlags, StartRule};
use thiserror::Error;

use super::STDIN_PATH;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum OptionError {
    #[error("missing input path")]
    MissingPath,
    #[error("unexpected argument `{0}`")]
    Unexpected(String),
    #[error("unknown option `{0}`")]
    Unknown(String),
    #[error("invalid color mode `{0}` (expected auto, always or never)")]
    Color(String),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CommandOptions {
    /// Input file, or [`STDIN_PATH`].
    pub path: String,
    pub start: StartRule,
    pub flags: ParseFlags,
    /// Encoding the input is known to be in.
    pub encoding: Option<String>,
    /// Hierarchical span output when logging is enabled.
    pub trace_tree: bool,
    pub color: ColorMode,
}

impl CommandOptions {
    /// Read switches and one input path from `args` (everything after the
    /// command name).
    pub fn parse(args: &[String]) -> Result<Self, OptionError> {
        let mut path = None;
        let mut options = CommandOptions {
            path: String::new(),
            start: StartRule::File,
            flags: ParseFlags::empty(),
            encoding: None,
            trace_tree: false,
            color: ColorMode::Auto,
        };
        for arg in args {
            match arg.as_str() {
                "--single" => options.start = StartRule::Single,
                "--eval" => options.start = StartRule::Eval,
                "--no-implied-dedent" => options.flags |= ParseFlags::DONT_IMPLY_DEDENT,
                "--ignore-cookie" => options.flags |= ParseFlags::IGNORE_COOKIE,
                "--async-always" => options.flags |= ParseFlags::ASYNC_ALWAYS,
                "--trace-tree" => options.trace_tree = true,
                _ => {
                    if let Some(name) = arg.strip_prefix("--encoding=") {
                        options.encoding = Some(name.to_owned());
                    } else if let Some(mode) = arg.strip_prefix("--color=") {
                        options.color = match mode {
                            "auto" => ColorMode::Auto,
                            "always" => ColorMode::Always,
                            "never" => ColorMode::Never,
                            _ => return Err(OptionError::Color(mode.to_owned())),
                        };
                    } else if arg.starts_with("--") {
                        return Err(OptionError::Unknown(arg.clone()));
                    } else if path.is_none() {
                        path = Some(arg.clone());
                    } else {
                        return Err(OptionError::Unexpected(arg.clone()));
                    }
                }
            }
        }
        options.path = path.ok_or(OptionError::MissingPath)?;
        Ok(options)
    }

    /// Name used for the input in diagnostics.
    pub fn display_name(&self) -> &str {
        if self.path == STDIN_PATH {
            "<stdin>"
        } else {
            &self.path
        }
    }
}
