//! Test fixture helpers for creating temporary schema and config files.

use std::path::{Path, PathBuf};

use snipconf::config::ConfigStore;
use snipconf::snippet::Snippet;
use tempfile::TempDir;

/// The "General" schema used across tests, as TOML.
pub const GENERAL_SCHEMA_TOML: &str = r#"
[[section]]
name = "General"

[[section.entry]]
key = "HOTKEY"
default = "F1"
comment = "hotkey"

[[section.entry]]
key = "save_screenshot"
default = false
comment = "save screenshots"

[[section]]
name = "Formulas"

[[section.entry]]
key = "add"
snippet = "return a + b"
params = ["a", "b"]
comment = "adds two numbers"
"#;

/// A temporary directory holding a schema file and a config path.
///
/// The directory is removed when the workspace is dropped.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `content` to `name` inside the workspace.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("Failed to read fixture")
    }

    /// Writes the "General" schema and returns its path.
    pub fn general_schema(&self) -> PathBuf {
        self.write("schema.toml", GENERAL_SCHEMA_TOML)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the "General" store in code.
///
/// # Panics
///
/// Panics if any declaration fails.
#[must_use]
pub fn general_store() -> ConfigStore {
    let mut store = ConfigStore::new();
    store
        .add_section("General")
        .add_entry("HOTKEY", "F1", "hotkey")
        .unwrap()
        .add_entry("save_screenshot", false, "save screenshots")
        .unwrap();
    store.build();
    store
}

/// Builds a store with one scalar of each kind and one snippet.
///
/// # Panics
///
/// Panics if any declaration fails.
#[must_use]
pub fn mixed_store() -> ConfigStore {
    let mut store = ConfigStore::new();
    store
        .add_section("Limits")
        .add_entry("COUNT", 1, "how many")
        .unwrap()
        .add_entry("RATIO", 0.5, "")
        .unwrap()
        .add_entry("HOTKEY_ENABLED", true, "enable the hotkey")
        .unwrap()
        .add_entry("LABEL", "start", "")
        .unwrap();
    store
        .add_section("Formulas")
        .add_entry(
            "SNIPPET",
            Snippet::new("return 0", &[] as &[&str]).unwrap(),
            "multi-line body",
        )
        .unwrap();
    store.build();
    store
}

/// Modification time of `path`.
///
/// # Panics
///
/// Panics if the metadata cannot be read.
#[must_use]
pub fn mtime(path: &Path) -> std::time::SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .expect("Failed to read mtime")
}
