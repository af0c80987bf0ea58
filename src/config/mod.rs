//! Configuration store.
//!
//! Declares a schema of sections and entries, persists it to a plain-text
//! file, and reconciles that file against the schema on every load. Values
//! are typed scalars or callable [`Snippet`](crate::snippet::Snippet)s.

mod declarative;
mod path;
mod scanner;
mod schema;
mod store;
mod value;

pub use declarative::{
    load_schema, load_schema_from_str, EntryDecl, ScalarDecl, SchemaFile, SchemaFormat,
    SectionDecl,
};
pub use path::{expand_home, home_dir};
pub use scanner::{ScanError, Scanner, Unit};
pub use schema::{Entry, Schema, Section, SectionBuilder};
pub use store::{ConfigStore, LoadReport, BANNER_RULE};
pub use value::{ConfigValue, Scalar};
