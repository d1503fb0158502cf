//! Backend selection for the inspection store.
//!
//! Each storage crate exposes one [`RepositoryFactory`]. The binary collects
//! them in a [`RepositoryRegistry`] and opens whichever one the resolved
//! [`DbConfig`] names.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{InspectionRepository, RepositoryError};

/// Which store to open and how to reach it.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `quotes.db`, `:memory:`             |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    /// Handed to the backend's factory untouched.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Opens the store, bringing its schema and rate tables up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InspectionRepository>, RepositoryError>;
}

/// The store backends compiled into a binary.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: Vec<Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a backend. A later factory shadows an earlier one of the same
    /// name.
    pub fn with(
        mut self,
        factory: impl RepositoryFactory + 'static,
    ) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Backend names, sorted and without duplicates.
    pub fn backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.iter().map(|f| f.backend_name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Opens the store named by `config.backend`, shared so a session and
    /// its background save can hold it at once.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no backend has that name.
    /// * Whatever the backend's factory returns.
    pub async fn open(
        &self,
        config: &DbConfig,
    ) -> Result<Arc<dyn InspectionRepository>, RepositoryError> {
        let factory = self
            .factories
            .iter()
            .rev()
            .find(|f| f.backend_name() == config.backend)
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "no '{}' store backend; known: {}",
                    config.backend,
                    self.backends().join(", ")
                ))
            })?;

        debug!(backend = factory.backend_name(), "opening store");
        Ok(Arc::from(factory.create(config).await?))
    }
}
