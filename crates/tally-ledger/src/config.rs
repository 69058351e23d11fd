//! Configuration resolution for the ledger adapter
//!
//! Callers hand the adapter either a literal [`DatabaseDescriptor`] or a
//! [`DescriptorProvider`] that produces one on demand. Literals are wrapped
//! in a [`StaticProvider`] at construction, so the rest of the crate only
//! ever calls [`DescriptorProvider::resolve`].

use crate::error::BoxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tally_db::ConnectionSettings;

/// Ledger table name used when the descriptor does not name one
pub const DEFAULT_MIGRATION_TABLE: &str = "migration";

/// Concrete connection descriptor for one database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseDescriptor<S = ConnectionSettings> {
    /// Target database identity
    pub name: String,

    /// Driver connection settings
    #[serde(default)]
    pub connection: S,

    /// Ledger table name (default: "migration")
    #[serde(default)]
    pub migration_table: Option<String>,
}

impl<S> DatabaseDescriptor<S> {
    pub fn new(name: impl Into<String>, connection: S) -> Self {
        Self {
            name: name.into(),
            connection,
            migration_table: None,
        }
    }

    /// Use `table` as the ledger table
    pub fn with_migration_table(mut self, table: impl Into<String>) -> Self {
        self.migration_table = Some(table.into());
        self
    }
}

/// Ledger table name for `descriptor`.
///
/// Call this on every freshly resolved descriptor; the name may change
/// between resolutions when the provider is dynamic.
pub fn resolve_table_name<S>(descriptor: &DatabaseDescriptor<S>) -> String {
    descriptor
        .migration_table
        .clone()
        .unwrap_or_else(|| DEFAULT_MIGRATION_TABLE.to_string())
}

/// Asynchronous source of [`DatabaseDescriptor`]s.
///
/// Resolved once per adapter operation. Async closures returning
/// `Result<DatabaseDescriptor<S>, BoxError>` implement this trait.
#[async_trait]
pub trait DescriptorProvider<S = ConnectionSettings>: Send + Sync {
    async fn resolve(&self) -> Result<DatabaseDescriptor<S>, BoxError>;
}

#[async_trait]
impl<S, F, Fut> DescriptorProvider<S> for F
where
    S: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<DatabaseDescriptor<S>, BoxError>> + Send + 'static,
{
    async fn resolve(&self) -> Result<DatabaseDescriptor<S>, BoxError> {
        (self)().await
    }
}

/// Provider that always yields the same descriptor
#[derive(Debug, Clone)]
pub struct StaticProvider<S = ConnectionSettings> {
    descriptor: DatabaseDescriptor<S>,
}

impl<S> StaticProvider<S> {
    pub fn new(descriptor: DatabaseDescriptor<S>) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl<S> DescriptorProvider<S> for StaticProvider<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn resolve(&self) -> Result<DatabaseDescriptor<S>, BoxError> {
        Ok(self.descriptor.clone())
    }
}

/// Where the adapter gets its database configuration
pub enum ConfigSource<S = ConnectionSettings> {
    /// A fixed descriptor
    Literal(DatabaseDescriptor<S>),
    /// A provider consulted on every operation
    Provider(Arc<dyn DescriptorProvider<S>>),
}

impl<S> ConfigSource<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Wrap any provider (including an async closure)
    pub fn provider(provider: impl DescriptorProvider<S> + 'static) -> Self {
        ConfigSource::Provider(Arc::new(provider))
    }

    /// Normalize to a provider so callers never branch on the source kind
    pub fn into_provider(self) -> Arc<dyn DescriptorProvider<S>> {
        match self {
            ConfigSource::Literal(descriptor) => Arc::new(StaticProvider::new(descriptor)),
            ConfigSource::Provider(provider) => provider,
        }
    }
}

impl<S> From<DatabaseDescriptor<S>> for ConfigSource<S> {
    fn from(descriptor: DatabaseDescriptor<S>) -> Self {
        ConfigSource::Literal(descriptor)
    }
}

impl<S> std::fmt::Debug for ConfigSource<S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Literal(descriptor) => f.debug_tuple("Literal").field(descriptor).finish(),
            ConfigSource::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Construction parameters for [`crate::LedgerAdapter`]
#[derive(Debug)]
pub struct AdapterParams<S = ConnectionSettings> {
    /// Database configuration. Required.
    pub database: Option<ConfigSource<S>>,

    /// Tables the session may touch, in addition to the ledger table.
    /// All tables are visible when unset.
    pub tables: Option<Vec<String>>,
}

impl<S> AdapterParams<S> {
    /// Params for a database configuration with no table restriction
    pub fn new(database: impl Into<ConfigSource<S>>) -> Self {
        Self {
            database: Some(database.into()),
            tables: None,
        }
    }

    /// Restrict the session to `tables`
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = Some(tables);
        self
    }
}

impl<S> Default for AdapterParams<S> {
    fn default() -> Self {
        Self {
            database: None,
            tables: None,
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
