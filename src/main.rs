//! snipconf - load, reconcile and query snippet-aware config files.
//!
//! Provides both human-friendly and script-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io;
use std::path::Path;

use clap::Parser;
use tracing::debug;

use snipconf::cli::{self, Cli, Commands};
use snipconf::config::{expand_home, load_schema, ConfigStore};
use snipconf::error::{ConfError, Result};
use snipconf::logging;
use snipconf::output::{Output, OutputMode, ValueRow, VersionInfo};
use snipconf::snippet::{Snippet, Value};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let output = OutputMode::from_cli(&cli).into_output();
    if let Err(e) = run(&cli, output.as_ref()) {
        output.error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &dyn Output) -> Result<()> {
    match &cli.command {
        Commands::Load(args) => cmd_load(cli, output, args),
        Commands::Get(args) => cmd_get(cli, output, args),
        Commands::Call(args) => cmd_call(cli, output, args),
        Commands::Render => cmd_render(cli, output),
        Commands::CheckSnippet(args) => cmd_check_snippet(output, args),
        Commands::Version => {
            cmd_version(output);
            Ok(())
        }
        Commands::Completions(args) => {
            cmd_completions(args);
            Ok(())
        }
    }
}

/// Builds a store from the `--schema` file.
fn schema_store(cli: &Cli) -> Result<ConfigStore> {
    let path = cli.schema.as_deref().ok_or(ConfError::NoSchema)?;
    load_schema(expand_home(path))?.into_store()
}

/// Builds the store and loads `config` into it.
fn loaded_store(cli: &Cli, output: &dyn Output, config: &Path) -> Result<ConfigStore> {
    let mut store = schema_store(cli)?;
    let report = store.load_and_update(expand_home(config))?;
    if report.rewritten && !report.created && !cli.quiet {
        output.warning(&format!(
            "{} was rewritten to match the schema",
            config.display()
        ));
    }
    Ok(store)
}

// === Commands ===

fn cmd_load(cli: &Cli, output: &dyn Output, args: &cli::LoadArgs) -> Result<()> {
    let path = expand_home(&args.config);
    let mut store = schema_store(cli)?;
    let report = store.load_and_update(&path)?;
    let values: Vec<ValueRow<'_>> = store
        .values()
        .into_iter()
        .map(|(key, value)| ValueRow::new(key, value))
        .collect();
    output.load_report(&path, &report, &values);
    Ok(())
}

fn cmd_get(cli: &Cli, output: &dyn Output, args: &cli::GetArgs) -> Result<()> {
    let store = loaded_store(cli, output, &args.config)?;
    let value = store.get(&args.key)?;
    output.value(&ValueRow::new(&args.key, value));
    Ok(())
}

fn cmd_call(cli: &Cli, output: &dyn Output, args: &cli::CallArgs) -> Result<()> {
    let store = loaded_store(cli, output, &args.config)?;
    let snippet = store.get_snippet(&args.key)?;
    let call_args: Vec<Value> = args.args.iter().map(|a| Value::parse_literal(a)).collect();
    debug!(key = %args.key, args = ?call_args, "Calling snippet");
    let result = snippet.call(&call_args)?;
    output.call_result(&args.key, &call_args, &result);
    Ok(())
}

fn cmd_render(cli: &Cli, output: &dyn Output) -> Result<()> {
    let store = schema_store(cli)?;
    output.rendered(&store.serialize());
    Ok(())
}

fn cmd_check_snippet(output: &dyn Output, args: &cli::CheckSnippetArgs) -> Result<()> {
    let snippet = Snippet::new(&args.body, args.params.as_slice())?;
    output.snippet_compiled(&snippet);
    Ok(())
}

fn cmd_version(output: &dyn Output) {
    output.version_info(&VersionInfo {
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty() == "true",
        build_timestamp: build_info::build_timestamp(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    });
}

fn cmd_completions(args: &cli::CompletionsArgs) {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "snipconf", &mut io::stdout());
}
