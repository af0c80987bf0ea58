//! Declarative schema files.
//!
//! Lets a schema be written in YAML or TOML instead of Rust code. Each
//! section lists its entries; an entry carries either a scalar `default`
//! (whose YAML/TOML type decides the value kind) or a `snippet` body with
//! its `params`.
//!
//! # Example TOML
//!
//! ```toml
//! [[section]]
//! name = "General"
//!
//! [[section.entry]]
//! key = "HOTKEY"
//! default = "F1"
//! comment = "hotkey"
//!
//! [[section.entry]]
//! key = "price"
//! snippet = "return a * 2"
//! params = ["a"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use super::store::ConfigStore;
use super::value::{ConfigValue, Scalar};
use crate::error::{ConfError, Result};
use crate::snippet::Snippet;

/// Schema file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// YAML format (.yaml, .yml).
    Yaml,
    /// TOML format (.toml).
    Toml,
}

impl SchemaFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        trace!(extension = %ext, "Detecting schema format from extension");
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// A scalar default as written in YAML or TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ScalarDecl {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<ScalarDecl> for Scalar {
    fn from(decl: ScalarDecl) -> Self {
        match decl {
            ScalarDecl::Bool(v) => Self::Bool(v),
            ScalarDecl::Int(v) => Self::Int(v),
            ScalarDecl::Float(v) => Self::Float(v),
            ScalarDecl::Str(v) => Self::Str(v),
        }
    }
}

/// One entry declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDecl {
    pub key: String,

    /// Scalar default. Mutually exclusive with `snippet`.
    #[serde(default)]
    pub default: Option<ScalarDecl>,

    /// Default snippet body. Mutually exclusive with `default`.
    #[serde(default)]
    pub snippet: Option<String>,

    /// Parameter names for `snippet`.
    #[serde(default)]
    pub params: Vec<String>,

    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SectionDecl {
    pub name: String,

    #[serde(default, rename = "entry", alias = "entries")]
    pub entries: Vec<EntryDecl>,
}

/// A parsed schema file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemaFile {
    #[serde(default, rename = "section", alias = "sections")]
    pub sections: Vec<SectionDecl>,

    /// Where the schema came from, for error messages.
    #[serde(skip)]
    origin: String,
}

impl SchemaFile {
    fn invalid(&self, message: String) -> ConfError {
        ConfError::SchemaFile {
            path: self.origin.clone(),
            message,
        }
    }

    fn entry_default(&self, entry: &EntryDecl) -> Result<ConfigValue> {
        match (&entry.default, &entry.snippet) {
            (Some(default), None) => {
                if !entry.params.is_empty() {
                    return Err(self.invalid(format!(
                        "entry '{}' has params but no snippet",
                        entry.key
                    )));
                }
                Ok(ConfigValue::Scalar(default.clone().into()))
            }
            (None, Some(body)) => Snippet::new(body, entry.params.as_slice())
                .map(ConfigValue::Snippet)
                .map_err(|source| ConfError::Compile {
                    key: entry.key.clone(),
                    source,
                }),
            (Some(_), Some(_)) => Err(self.invalid(format!(
                "entry '{}' has both a default and a snippet",
                entry.key
            ))),
            (None, None) => Err(self.invalid(format!(
                "entry '{}' needs a default or a snippet",
                entry.key
            ))),
        }
    }

    /// Declares every section and entry on `store`, then builds it.
    ///
    /// # Errors
    ///
    /// Fails on a malformed entry, a snippet that does not compile, or any
    /// declaration error from the store (duplicate or invalid key).
    #[instrument(skip_all, fields(origin = %self.origin, sections = self.sections.len()))]
    pub fn declare_into(&self, store: &mut ConfigStore) -> Result<()> {
        for section in &self.sections {
            let mut builder = store.add_section(&section.name);
            for entry in &section.entries {
                let default = self.entry_default(entry)?;
                builder.add_entry(&entry.key, default, &entry.comment)?;
            }
            debug!(
                section = %section.name,
                entries = section.entries.len(),
                "Declared section from schema file"
            );
        }
        store.build();
        Ok(())
    }

    /// Builds a fresh store from this schema.
    ///
    /// # Errors
    ///
    /// See [`declare_into`](Self::declare_into).
    pub fn into_store(&self) -> Result<ConfigStore> {
        let mut store = ConfigStore::new();
        self.declare_into(&mut store)?;
        Ok(store)
    }
}

/// Load a schema file, detecting YAML or TOML from the extension.
///
/// # Errors
///
/// Returns an error if:
/// - The format cannot be detected from the extension
/// - The file cannot be read
/// - The content cannot be parsed
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<SchemaFile> {
    let path = path.as_ref();
    info!("Loading schema file");

    let format = SchemaFormat::from_extension(path).ok_or_else(|| ConfError::SchemaFile {
        path: path.display().to_string(),
        message: "unknown format: expected .yaml, .yml, or .toml".to_string(),
    })?;
    debug!(format = ?format, "Detected schema format");

    let content = std::fs::read_to_string(path).map_err(|e| ConfError::io(path, e))?;
    debug!(bytes = content.len(), "Read schema file");

    let mut schema = load_schema_from_str(&content, format).map_err(|e| match e {
        ConfError::SchemaFile { message, .. } => ConfError::SchemaFile {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })?;
    schema.origin = path.display().to_string();
    Ok(schema)
}

/// Parse a schema from a string with a specified format.
///
/// # Errors
///
/// Returns an error if the content cannot be parsed.
#[instrument(skip(content), fields(format = ?format, content_len = content.len()))]
pub fn load_schema_from_str(content: &str, format: SchemaFormat) -> Result<SchemaFile> {
    let parse_error = |message: String| ConfError::SchemaFile {
        path: "<inline>".to_string(),
        message,
    };
    let mut schema: SchemaFile = match format {
        SchemaFormat::Yaml if content.trim().is_empty() => SchemaFile::default(),
        SchemaFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| parse_error(format!("YAML: {e}")))?
        }
        SchemaFormat::Toml => {
            toml::from_str(content).map_err(|e| parse_error(format!("TOML: {e}")))?
        }
    };
    schema.origin = "<inline>".to_string();

    info!(
        sections = schema.sections.len(),
        entries = schema.sections.iter().map(|s| s.entries.len()).sum::<usize>(),
        "Schema parsed"
    );
    Ok(schema)
}
