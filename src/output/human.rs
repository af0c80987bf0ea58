//! Human-friendly output implementation using console styling.

use std::path::Path;

use console::{style, StyledObject};
use tracing::{debug, instrument, trace};

use crate::config::{ConfigValue, LoadReport};
use crate::error::ConfError;
use crate::snippet::{Snippet, Value};

use super::{Output, ValueRow, VersionInfo};

/// Styled terminal output implementation for human users.
pub struct HumanOutput {
    color: bool,
}

impl HumanOutput {
    #[instrument]
    pub fn new(color: bool) -> Self {
        debug!("Creating HumanOutput");
        if !color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
        Self { color }
    }

    fn styled<D>(&self, value: D) -> StyledObject<D> {
        let styled = style(value);
        if self.color {
            styled
        } else {
            styled.force_styling(false)
        }
    }

    fn list_strings(&self, label: &str, items: &[String]) {
        if !items.is_empty() {
            println!("  {} {}", self.styled(label).dim(), items.join(", "));
        }
    }

    fn print_row(&self, row: &ValueRow<'_>) {
        let value = match row.value {
            ConfigValue::Snippet(snippet) => format_snippet(snippet),
            ConfigValue::Scalar(scalar) => scalar.to_string(),
        };
        println!(
            "{} {} {}",
            self.styled(row.key).cyan().bold(),
            self.styled("=").dim(),
            value
        );
    }
}

/// Multi-line bodies start on their own line so they stay readable.
fn format_snippet(snippet: &Snippet) -> String {
    if snippet.body().contains('\n') {
        format!("({})\n{}", snippet.params().join(", "), snippet)
    } else {
        format!("({}) {}", snippet.params().join(", "), snippet)
    }
}

impl Output for HumanOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        debug!(message, "Outputting success");
        println!("{} {message}", self.styled("[OK]").green().bold());
    }

    #[instrument(skip(self))]
    fn error(&self, error: &ConfError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Outputting error"
        );
        eprintln!("{}: {error}", self.styled("Error").red().bold());
        if let Some(suggestion) = error.suggestion() {
            trace!(suggestion, "Adding suggestion");
            eprintln!("{}: {suggestion}", self.styled("Hint").yellow());
        }
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        debug!(message, "Outputting warning");
        eprintln!("{} {message}", self.styled("[WARN]").yellow().bold());
    }

    #[instrument(skip(self, report, values), fields(count = values.len()))]
    fn load_report(&self, path: &Path, report: &LoadReport, values: &[ValueRow<'_>]) {
        let path = path.display();
        if report.created {
            self.success(&format!("Created {path} from defaults"));
        } else if report.rewritten {
            self.success(&format!("Loaded {path} and rewrote it to match the schema"));
        } else {
            self.success(&format!("Loaded {path}"));
        }
        self.list_strings("filled:", &report.filled);
        self.list_strings("dropped:", &report.dropped);
        if !report.stray_lines.is_empty() {
            let lines: Vec<String> = report.stray_lines.iter().map(ToString::to_string).collect();
            self.list_strings("discarded lines:", &lines);
        }
        println!();
        for row in values {
            self.print_row(row);
        }
    }

    #[instrument(skip(self, row), fields(key = row.key))]
    fn value(&self, row: &ValueRow<'_>) {
        self.print_row(row);
    }

    #[instrument(skip(self, args, result))]
    fn call_result(&self, key: &str, args: &[Value], result: &Value) {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        println!(
            "{}({}) {} {result}",
            self.styled(key).cyan().bold(),
            args.join(", "),
            self.styled("->").dim()
        );
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    fn rendered(&self, text: &str) {
        print!("{text}");
    }

    #[instrument(skip(self, snippet))]
    fn snippet_compiled(&self, snippet: &Snippet) {
        self.success(&format!(
            "Snippet compiles (params: {})",
            snippet.params().join(", ")
        ));
    }

    #[instrument(skip(self, info))]
    fn version_info(&self, info: &VersionInfo) {
        println!("snipconf {}", info.version);
        println!(
            "git: {}{}",
            info.git_sha,
            if info.git_dirty { " (dirty)" } else { "" }
        );
        println!("built: {}", info.build_timestamp);
        println!("rustc: {}", info.rustc_version);
        println!("target: {}", info.target);
    }
}
