//! snipconf - a configuration store whose values may be callable snippets.
//!
//! An application declares sections of entries, each with a default that is
//! either a scalar (bool, int, float, string) or a snippet: a small
//! parameterised function body. The store persists these to a commented
//! plain-text file, reconciles that file against the schema on every load
//! (filling missing keys, dropping undeclared ones), and serves typed values.
//!
//! # Modules
//!
//! - `config`: Schema declaration, the file format, and the store
//! - `snippet`: The embedded snippet language
//! - `error`: Error types with user-recoverable hints
//! - `output`: Output mode abstraction (robot/human)
//! - `cli`: Command-line definitions for the `snipconf` binary
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod snippet;
