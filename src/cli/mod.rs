//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// snipconf - load, reconcile and query snippet-aware config files.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "snipconf", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "SNIPCONF_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Schema file (YAML or TOML) declaring sections and entries
    #[arg(long, short = 's', global = true, env = "SNIPCONF_SCHEMA")]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a config file, reconcile it with the schema, and list its values
    Load(LoadArgs),

    /// Load a config file and print one value
    Get(GetArgs),

    /// Load a config file and call one of its snippets
    Call(CallArgs),

    /// Print the config file the schema's defaults would produce
    Render,

    /// Compile a snippet body and report any errors
    CheckSnippet(CheckSnippetArgs),

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Config file; created from defaults if missing
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Config file; created from defaults if missing
    pub config: PathBuf,

    /// Key to look up
    pub key: String,
}

/// Arguments for calling a snippet.
///
/// # Examples
///
/// ```bash
/// snipconf --schema app.toml call settings.cfg price 21
/// snipconf --schema app.toml call settings.cfg greet "'world'" True
/// ```
#[derive(Parser, Debug)]
pub struct CallArgs {
    /// Config file; created from defaults if missing
    pub config: PathBuf,

    /// Snippet key
    pub key: String,

    /// Positional arguments: numbers, True/False/None, quoted strings, or bare words
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct CheckSnippetArgs {
    /// Comma-separated parameter names
    #[arg(long, short = 'p', value_delimiter = ',')]
    pub params: Vec<String>,

    /// Snippet body
    pub body: String,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
