//! Error types for configuration store operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::snippet::SnippetError;

/// Primary error type for configuration store operations.
#[derive(Error, Debug)]
pub enum ConfError {
    // Schema errors
    #[error("Key '{key}' is already declared in section '{section}'")]
    DuplicateKey { key: String, section: String },

    #[error("Invalid key '{key}': keys must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidKey { key: String },

    #[error("Unknown configuration key: {key}")]
    UnknownKey { key: String },

    #[error("Key '{key}' holds a {actual} value, not a {expected}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Default for '{key}' cannot be stored in a config file: {reason}")]
    UnrepresentableDefault { key: String, reason: &'static str },

    #[error("Schema has not been built; call build() after declaring entries")]
    NotBuilt,

    // File format errors
    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Snippet for '{key}' failed to compile: {source}")]
    Compile {
        key: String,
        #[source]
        source: SnippetError,
    },

    #[error("Cannot read '{text}' as {kind} for key '{key}'")]
    Coercion {
        key: String,
        kind: &'static str,
        text: String,
    },

    // Declarative schema errors
    #[error("Schema file {path}: {message}")]
    SchemaFile { path: String, message: String },

    #[error("No schema given")]
    NoSchema,

    // Snippet compile or call outside a config file
    #[error("Snippet error: {0}")]
    Snippet(#[from] SnippetError),

    // General errors
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if editing the config or schema file can fix the error.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::Compile { .. }
                | Self::Coercion { .. }
                | Self::SchemaFile { .. }
                | Self::UnknownKey { .. }
                | Self::NoSchema
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateKey { .. } => Some("Every key must be declared exactly once"),
            Self::UnrepresentableDefault { .. } => {
                Some("String defaults must be a single trimmed line without '=' or \"\"\"")
            }
            Self::NotBuilt => Some("Call build() once all sections are declared"),
            Self::Parse { .. } => Some("Close every snippet with a matching \"\"\" marker"),
            Self::Compile { .. } => {
                Some("Fix the snippet body, or delete the key to restore its default")
            }
            Self::Coercion { .. } => {
                Some("Fix the value, or delete the line to restore its default")
            }
            Self::UnknownKey { .. } => Some("Run: snipconf load <config> to list declared keys"),
            Self::NoSchema => Some("Pass --schema <file> or set SNIPCONF_SCHEMA"),
            Self::SchemaFile { .. } => {
                Some("Each entry needs a key and exactly one of default or snippet")
            }
            _ => None,
        }
    }
}

/// Convenience type alias for Results using ConfError.
pub type Result<T> = std::result::Result<T, ConfError>;
