//! Registry configuration
//!
//! Settings that shape derived names, loadable from a TOML file:
//!
//! ```toml
//! singular_table = true
//! database = "postgres"
//! ```

use ormeta_core::{DatabaseType, EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a descriptor registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Use snake_case type names as table names without pluralizing
    pub singular_table: bool,

    /// Target database, used by consumers to pick a dialect
    pub database: DatabaseType,
}

impl RegistryConfig {
    /// Parse a configuration from TOML
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        toml::from_str(content).map_err(|e| EngineError::invalid_config(e.to_string()))
    }

    /// Load a configuration file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ormeta_ir::RegistryConfig;
    ///
    /// let config = RegistryConfig::load("ormeta.toml")?;
    /// ```
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            EngineError::InvalidConfig(message) => EngineError::FileRead {
                path: path.to_path_buf(),
                message: format!("Invalid configuration file: {}", message),
            },
            other => other,
        })
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string(self).map_err(|e| EngineError::internal(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
