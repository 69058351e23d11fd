//! Configuration types and parsing for tally.yml

use crate::config::{AdapterParams, ConfigSource, DatabaseDescriptor, DescriptorProvider};
use crate::error::{BoxError, LedgerError, LedgerResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default config file name looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "tally.yml";

/// Ledger configuration from tally.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Database connection configuration
    pub database: DatabaseDescriptor,

    /// Tables the session may touch besides the ledger table
    #[serde(default)]
    pub tables: Option<Vec<String>>,
}

impl LedgerConfig {
    /// Load and validate a config file.
    ///
    /// A relative `database.connection.path` is resolved against the
    /// directory holding the config file.
    pub fn load(path: &Path) -> LedgerResult<Self> {
        if !path.exists() {
            return Err(LedgerError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_yaml(&contents).map_err(|e| match e {
            LedgerError::ConfigParse { message, .. } => LedgerError::ConfigParse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse and validate config from a YAML string
    pub fn from_yaml(contents: &str) -> LedgerResult<Self> {
        let config: Self =
            serde_yaml::from_str(contents).map_err(|e| LedgerError::ConfigParse {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Ledger table this config resolves to
    pub fn migration_table(&self) -> String {
        crate::config::resolve_table_name(&self.database)
    }

    /// Adapter params holding this config as a literal descriptor
    pub fn into_params(self) -> AdapterParams {
        AdapterParams {
            database: Some(ConfigSource::Literal(self.database)),
            tables: self.tables,
        }
    }

    fn validate(&self) -> LedgerResult<()> {
        if self.database.name.trim().is_empty() {
            return Err(LedgerError::ConfigInvalid {
                message: "database.name must not be empty".to_string(),
            });
        }
        if let Some(table) = &self.database.migration_table {
            if table.trim().is_empty() {
                return Err(LedgerError::ConfigInvalid {
                    message: "database.migration_table must not be empty when set".to_string(),
                });
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(dir) = &self.database.connection.path {
            if dir.is_relative() {
                self.database.connection.path = Some(base.join(dir));
            }
        }
    }
}

/// Provider that re-reads a config file on every resolution
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DescriptorProvider for FileProvider {
    async fn resolve(&self) -> Result<DatabaseDescriptor, BoxError> {
        let config = LedgerConfig::load(&self.path)?;
        Ok(config.database)
    }
}

impl AdapterParams {
    /// Params backed by a config file.
    ///
    /// The file is loaded once here so a broken config fails before any
    /// I/O against the database. Each adapter operation then re-reads it.
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let config = LedgerConfig::load(path)?;
        Ok(Self {
            database: Some(ConfigSource::Provider(Arc::new(FileProvider::new(path)))),
            tables: config.tables,
        })
    }
}

#[cfg(test)]
#[path = "config_file_test.rs"]
mod tests;
