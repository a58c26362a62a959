//! Tag annotation parsing
//!
//! A field's annotations are `;`-separated `KEY:VALUE` (or bare `KEY`)
//! fragments, e.g. `"type:varchar(100);not null;default:'draft'"`. Keys are
//! matched case-insensitively; a bare key maps to itself, so
//! `not null` yields `NOT NULL => "NOT NULL"`, which the column builder can
//! append verbatim.

use ormeta_core::FieldDef;
use serde::Serialize;
use std::collections::BTreeMap;

/// Annotation channels, in the order they are applied
pub const TAG_CHANNELS: [&str; 2] = ["sql", "orm"];

// ============================================================================
// Recognized Keys
// ============================================================================

pub const PRIMARY_KEY: &str = "PRIMARY_KEY";
pub const DEFAULT: &str = "DEFAULT";
pub const COLUMN: &str = "COLUMN";
pub const EMBEDDED: &str = "EMBEDDED";
pub const FOREIGNKEY: &str = "FOREIGNKEY";
pub const ASSOCIATIONFOREIGNKEY: &str = "ASSOCIATIONFOREIGNKEY";
pub const MANY2MANY: &str = "MANY2MANY";
pub const POLYMORPHIC: &str = "POLYMORPHIC";
pub const TYPE: &str = "TYPE";
pub const SIZE: &str = "SIZE";
pub const AUTO_INCREMENT: &str = "AUTO_INCREMENT";
pub const NOT_NULL: &str = "NOT NULL";
pub const UNIQUE: &str = "UNIQUE";
pub const INDEX: &str = "INDEX";
/// Skip the field for schema purposes; values can still be decoded into it
pub const IGNORE: &str = "-";

// ============================================================================
// TagSettings
// ============================================================================

/// Parsed, case-normalized annotations of one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSettings(BTreeMap<String, String>);

impl TagSettings {
    /// Parse all annotation channels of a field declaration
    ///
    /// Channels are applied in `TAG_CHANNELS` order, so a key set on `orm`
    /// overrides the same key set on `sql`. Unknown channels are ignored.
    pub fn from_field(field: &FieldDef) -> Self {
        let mut settings = Self::default();
        for channel in TAG_CHANNELS {
            for raw in field.tags_on(channel) {
                settings.merge(raw);
            }
        }
        settings
    }

    /// Parse a single annotation string
    pub fn parse(raw: &str) -> Self {
        let mut settings = Self::default();
        settings.merge(raw);
        settings
    }

    /// Apply the fragments of `raw`, overwriting existing keys
    pub fn merge(&mut self, raw: &str) {
        for fragment in raw.split(';') {
            let mut parts = fragment.splitn(2, ':');
            let key = parts.next().unwrap_or_default().trim().to_uppercase();
            if key.is_empty() {
                continue;
            }
            let value = match parts.next() {
                Some(value) => value.to_string(),
                None => key.clone(),
            };
            self.0.insert(key, value);
        }
    }

    /// Value of a key (keys are upper-case)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Non-empty value of a key
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Comma-separated list value of a key; empty when absent or blank
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.non_empty(key) {
            Some(value) => value.split(',').map(|item| item.trim().to_string()).collect(),
            None => Vec::new(),
        }
    }

    /// Check if the field is excluded from the schema
    pub fn is_ignored(&self) -> bool {
        self.contains(IGNORE)
    }

    /// Number of settings
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no settings were given
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
