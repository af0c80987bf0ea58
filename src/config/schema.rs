//! Schema declaration: sections and their entries.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::value::ConfigValue;
use crate::error::{ConfError, Result};
use crate::snippet::is_identifier;

/// One declared configuration key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub key: String,
    pub default: ConfigValue,
    /// Comment text, already carrying its `(DEFAULT: ..)` / `(PARAMS: ..)` suffix.
    pub comment: String,
}

/// A named group of entries, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Entry>,
}

/// All declared sections plus a key index used to reject duplicates.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    sections: Vec<Section>,
    owners: HashMap<String, usize>,
    revision: u64,
}

impl Schema {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Bumped on every declaration; lets the store notice a stale `build()`.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    pub(crate) fn push_section(&mut self, name: &str) -> usize {
        self.revision += 1;
        self.sections.push(Section {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.sections.len() - 1
    }

    pub(crate) fn push_entry(
        &mut self,
        section: usize,
        key: &str,
        default: ConfigValue,
        comment: &str,
    ) -> Result<()> {
        if !is_identifier(key) {
            return Err(ConfError::InvalidKey {
                key: key.to_string(),
            });
        }
        if let Some(&owner) = self.owners.get(key) {
            return Err(ConfError::DuplicateKey {
                key: key.to_string(),
                section: self.sections[owner].name.clone(),
            });
        }
        let unrepresentable = match &default {
            ConfigValue::Scalar(scalar) => scalar.unrepresentable_reason(),
            ConfigValue::Snippet(_) => None,
        };
        if let Some(reason) = unrepresentable {
            return Err(ConfError::UnrepresentableDefault {
                key: key.to_string(),
                reason,
            });
        }

        let suffix = default.comment_suffix();
        let comment = if comment.is_empty() {
            suffix
        } else {
            format!("{comment} {suffix}")
        };
        debug!(
            key,
            section = %self.sections[section].name,
            kind = default.kind(),
            "Declared entry"
        );

        self.owners.insert(key.to_string(), section);
        self.sections[section].entries.push(Entry {
            key: key.to_string(),
            default,
            comment,
        });
        self.revision += 1;
        Ok(())
    }
}

/// Handle returned by [`ConfigStore::add_section`](super::ConfigStore::add_section)
/// for declaring that section's entries.
#[derive(Debug)]
pub struct SectionBuilder<'a> {
    schema: &'a mut Schema,
    index: usize,
}

impl<'a> SectionBuilder<'a> {
    pub(crate) const fn new(schema: &'a mut Schema, index: usize) -> Self {
        Self { schema, index }
    }

    /// Declares `key` with its default value and comment.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfError::DuplicateKey`] if any section already declares
    /// `key`, [`ConfError::InvalidKey`] if `key` is not an identifier, or
    /// [`ConfError::UnrepresentableDefault`] if a string default would not
    /// read back unchanged from the config file.
    pub fn add_entry(
        &mut self,
        key: &str,
        default: impl Into<ConfigValue>,
        comment: &str,
    ) -> Result<&mut Self> {
        self.schema
            .push_entry(self.index, key, default.into(), comment)?;
        Ok(self)
    }
}
