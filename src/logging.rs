//! Logging setup for the snipconf CLI.
//!
//! Logs go to stderr so stdout stays clean for config listings and robot
//! JSON. `-v` flags widen the filter one layer of the store at a time.

use std::io::{self, IsTerminal};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON lines, for `--robot` runs.
    Json,
    /// Colored output for an interactive terminal.
    Pretty,
    /// Plain single-line output when stderr is piped.
    Compact,
}

impl LogFormat {
    pub const fn select(robot_mode: bool, stderr_is_tty: bool) -> Self {
        if robot_mode {
            Self::Json
        } else if stderr_is_tty {
            Self::Pretty
        } else {
            Self::Compact
        }
    }
}

/// Default filter for the given flags.
///
/// | Flags | Shows |
/// |-------|-------|
/// | `-q` | errors only |
/// | none | load outcomes, dropped keys, stray lines |
/// | `-v` | declarations, fills and file writes; snippet compiler stays quiet |
/// | `-vv` | snippet compilation as well |
/// | `-vvv` | every scanned line and loaded entry |
pub const fn filter_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "snipconf=error";
    }
    match verbose {
        0 => "snipconf=info",
        1 => "snipconf=debug,snipconf::snippet=info",
        2 => "snipconf=debug",
        _ => "snipconf=trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` replaces the default filter
/// when set.
pub fn init_logging(robot_mode: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, quiet)));

    match LogFormat::select(robot_mode, io::stderr().is_terminal()) {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE)
                .with_writer(io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .with_writer(io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .compact()
                .with_writer(io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
    }
}
