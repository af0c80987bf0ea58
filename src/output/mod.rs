//! Output mode abstraction for robot and human output.

use std::path::Path;

use serde::Serialize;

use crate::cli::Cli;
use crate::config::{ConfigValue, LoadReport};
use crate::error::ConfError;
use crate::snippet::{Snippet, Value};

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

/// One key and its value, as listed by `load`.
#[derive(Debug, Clone, Serialize)]
pub struct ValueRow<'a> {
    pub key: &'a str,
    pub kind: &'static str,
    pub value: &'a ConfigValue,
}

impl<'a> ValueRow<'a> {
    #[must_use]
    pub const fn new(key: &'a str, value: &'a ConfigValue) -> Self {
        Self {
            key,
            kind: value.kind(),
            value,
        }
    }
}

/// Build metadata shown by `version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
    pub target: &'static str,
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    /// JSON output for scripting.
    Robot(RobotFormat),
    /// Styled terminal output for human users.
    Human { color: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human {
                color: !cli.no_color,
            }
        }
    }

    /// Returns true if output should be JSON.
    #[must_use]
    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human { color } => Box::new(HumanOutput::new(color)),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    // Basic messages
    fn success(&self, message: &str);
    fn error(&self, error: &ConfError);
    fn warning(&self, message: &str);

    // Store operations
    fn load_report(&self, path: &Path, report: &LoadReport, values: &[ValueRow<'_>]);
    fn value(&self, row: &ValueRow<'_>);
    fn call_result(&self, key: &str, args: &[Value], result: &Value);
    fn rendered(&self, text: &str);
    fn snippet_compiled(&self, snippet: &Snippet);

    // Metadata
    fn version_info(&self, info: &VersionInfo);
}
