//! The configuration store: schema, defaults, and the values loaded from disk.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use super::scanner::{ScanError, Scanner, Unit};
use super::schema::{Schema, SectionBuilder};
use super::value::{ConfigValue, Scalar};
use crate::error::{ConfError, Result};
use crate::snippet::Snippet;

/// Rule line framing each section name in the config file.
pub const BANNER_RULE: &str =
    "#===============================================================================";

/// What `load_and_update` found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// The file did not exist and was created from defaults.
    pub created: bool,
    /// The file was rewritten to match the schema.
    pub rewritten: bool,
    /// Declared keys missing from the file, filled from defaults.
    pub filled: Vec<String>,
    /// Undeclared keys found in the file and discarded.
    pub dropped: Vec<String>,
    /// Line numbers of non-assignment lines that were discarded.
    pub stray_lines: Vec<usize>,
}

impl LoadReport {
    /// True when the file on disk had drifted from the schema.
    pub fn needs_save(&self) -> bool {
        !self.filled.is_empty() || !self.dropped.is_empty() || !self.stray_lines.is_empty()
    }
}

/// Declares a schema, loads and reconciles a config file against it, and
/// serves the resulting values.
///
/// # Example
///
/// ```no_run
/// use snipconf::config::ConfigStore;
/// use snipconf::snippet::Snippet;
///
/// # fn main() -> snipconf::error::Result<()> {
/// let mut store = ConfigStore::new();
/// store
///     .add_section("General")
///     .add_entry("HOTKEY", "F1", "hotkey")?
///     .add_entry("save_screenshot", false, "keep screenshots")?
///     .add_entry("price", Snippet::new("return a * 2", &["a"])?, "price formula")?;
/// store.build();
/// store.load_and_update("settings.cfg")?;
///
/// let hotkey = store.get_str("HOTKEY")?;
/// let doubled = store.get_snippet("price")?.call(&[21.into()])?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    schema: Schema,
    defaults: HashMap<String, ConfigValue>,
    current: HashMap<String, ConfigValue>,
    built_revision: Option<u64>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new section and returns a handle for declaring its entries.
    pub fn add_section(&mut self, name: &str) -> SectionBuilder<'_> {
        let index = self.schema.push_section(name);
        debug!(section = name, "Declared section");
        SectionBuilder::new(&mut self.schema, index)
    }

    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Recomputes the key → default map from the declarations.
    pub fn build(&mut self) {
        self.defaults.clear();
        for entry in self.schema.entries() {
            self.defaults.insert(entry.key.clone(), entry.default.clone());
        }
        self.built_revision = Some(self.schema.revision());
        debug!(keys = self.defaults.len(), "Built defaults");
    }

    fn ensure_built(&self) -> Result<()> {
        if self.built_revision == Some(self.schema.revision()) {
            Ok(())
        } else {
            Err(ConfError::NotBuilt)
        }
    }

    /// Loads `path`, reconciles it against the schema, and rewrites it if it
    /// drifted.
    ///
    /// A missing file is created from the defaults. Otherwise undeclared keys
    /// and stray lines are dropped, missing keys are filled from defaults, and
    /// the file is rewritten only when one of those happened. The loaded
    /// values replace the previous ones only if the whole load succeeds.
    ///
    /// # Errors
    ///
    /// Fails if the store was not built, the file cannot be read or written,
    /// a snippet marker is unterminated, a snippet body does not compile, or a
    /// scalar does not convert to its declared type.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_and_update<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        self.ensure_built()?;

        let exists = path.try_exists().map_err(|e| ConfError::io(path, e))?;
        if !exists {
            info!("Config file missing, writing defaults");
            self.write_values(path, &self.defaults)?;
            self.current = self.defaults.clone();
            return Ok(LoadReport {
                created: true,
                rewritten: true,
                ..LoadReport::default()
            });
        }

        let text = std::fs::read_to_string(path).map_err(|e| ConfError::io(path, e))?;
        debug!(bytes = text.len(), "Read config file");

        let (loaded, mut report) = self.reconcile(&text).map_err(|e| match e {
            Reconcile::Scan(scan) => ConfError::Parse {
                path: path.display().to_string(),
                line: scan.line(),
                message: scan.to_string(),
            },
            Reconcile::Value(err) => err,
        })?;

        if report.needs_save() {
            info!(
                filled = report.filled.len(),
                dropped = report.dropped.len(),
                stray = report.stray_lines.len(),
                "Config drifted from schema, rewriting"
            );
            self.write_values(path, &loaded)?;
            report.rewritten = true;
        } else {
            info!(keys = loaded.len(), "Config loaded");
        }
        self.current = loaded;
        Ok(report)
    }

    /// Builds the full key → value map for `text` without touching `self`.
    fn reconcile(
        &self,
        text: &str,
    ) -> std::result::Result<(HashMap<String, ConfigValue>, LoadReport), Reconcile> {
        let mut loaded = HashMap::with_capacity(self.defaults.len());
        let mut report = LoadReport::default();

        for unit in Scanner::new(text) {
            let unit = unit.map_err(Reconcile::Scan)?;
            let (key, value) = match unit {
                Unit::Stray { line, .. } => {
                    warn!(line, "Discarding line that is not an assignment");
                    report.stray_lines.push(line);
                    continue;
                }
                Unit::Scalar { key, text, line } => {
                    let Some(default) = self.defaults.get(key) else {
                        warn!(key, line, "Discarding undeclared key");
                        report.dropped.push(key.to_string());
                        continue;
                    };
                    (key, default.coerce_scalar_text(key, text))
                }
                Unit::Snippet { key, body, line } => {
                    let Some(default) = self.defaults.get(key) else {
                        warn!(key, line, "Discarding undeclared snippet key");
                        report.dropped.push(key.to_string());
                        continue;
                    };
                    (key, default.compile_snippet_text(key, body))
                }
            };
            let value = value.map_err(Reconcile::Value)?;
            trace!(key, kind = value.kind(), "Loaded entry");
            if loaded.insert(key.to_string(), value).is_some() {
                debug!(key, "Key repeated in file, last occurrence wins");
            }
        }

        for entry in self.schema.entries() {
            if !loaded.contains_key(&entry.key) {
                debug!(key = %entry.key, "Filling missing key from default");
                loaded.insert(entry.key.clone(), entry.default.clone());
                report.filled.push(entry.key.clone());
            }
        }

        Ok((loaded, report))
    }

    /// Looks up the value for `key`.
    ///
    /// Before the first load this is the declared default.
    ///
    /// # Errors
    ///
    /// [`ConfError::UnknownKey`] if `key` was never declared.
    pub fn get(&self, key: &str) -> Result<&ConfigValue> {
        self.current
            .get(key)
            .or_else(|| self.defaults.get(key))
            .ok_or_else(|| ConfError::UnknownKey {
                key: key.to_string(),
            })
    }

    fn mismatch(key: &str, expected: &'static str, actual: &ConfigValue) -> ConfError {
        ConfError::KindMismatch {
            key: key.to_string(),
            expected,
            actual: actual.kind(),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key)? {
            ConfigValue::Scalar(Scalar::Bool(v)) => Ok(*v),
            other => Err(Self::mismatch(key, "bool", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.get(key)? {
            ConfigValue::Scalar(Scalar::Int(v)) => Ok(*v),
            other => Err(Self::mismatch(key, "int", other)),
        }
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.get(key)? {
            ConfigValue::Scalar(Scalar::Float(v)) => Ok(*v),
            other => Err(Self::mismatch(key, "float", other)),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.get(key)? {
            ConfigValue::Scalar(Scalar::Str(v)) => Ok(v),
            other => Err(Self::mismatch(key, "str", other)),
        }
    }

    pub fn get_snippet(&self, key: &str) -> Result<&Snippet> {
        match self.get(key)? {
            ConfigValue::Snippet(snippet) => Ok(snippet),
            other => Err(Self::mismatch(key, "snippet", other)),
        }
    }

    /// All keys with their current values, in file order.
    pub fn values(&self) -> Vec<(&str, &ConfigValue)> {
        self.sorted_sections()
            .into_iter()
            .flat_map(|(_, entries)| entries)
            .filter_map(|key| self.get(key).ok().map(|value| (key, value)))
            .collect()
    }

    /// Section names with their keys sorted, in declaration order.
    fn sorted_sections(&self) -> Vec<(&str, Vec<&str>)> {
        self.schema
            .sections()
            .iter()
            .map(|section| {
                let mut keys: Vec<&str> = section.entries.iter().map(|e| e.key.as_str()).collect();
                keys.sort_unstable();
                (section.name.as_str(), keys)
            })
            .collect()
    }

    /// Renders the store in config file format.
    pub fn serialize(&self) -> String {
        self.render(&self.current)
    }

    /// Renders `values` in config file format, falling back to defaults for
    /// keys they lack.
    fn render(&self, values: &HashMap<String, ConfigValue>) -> String {
        let mut out = String::new();
        for section in self.schema.sections() {
            out.push_str(BANNER_RULE);
            out.push('\n');
            out.push_str(&format!("# {}\n", section.name));
            out.push_str(BANNER_RULE);
            out.push('\n');

            let mut entries: Vec<_> = section.entries.iter().collect();
            entries.sort_by(|a, b| a.key.cmp(&b.key));
            for entry in entries {
                for line in entry.comment.lines() {
                    out.push_str(&format!("# {line}\n"));
                }
                let value = values.get(&entry.key).unwrap_or(&entry.default);
                out.push_str(&format!("{} = {value}\n\n", entry.key));
            }
        }
        out
    }

    /// Writes [`serialize`](Self::serialize) to `path`, replacing its contents.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_values(path.as_ref(), &self.current)
    }

    fn write_values(&self, path: &Path, values: &HashMap<String, ConfigValue>) -> Result<()> {
        let text = self.render(values);
        std::fs::write(path, &text).map_err(|e| ConfError::io(path, e))?;
        debug!(bytes = text.len(), "Wrote config file");
        Ok(())
    }
}

/// Failure inside `reconcile`, before the path is attached.
enum Reconcile {
    Scan(ScanError),
    Value(ConfError),
}
