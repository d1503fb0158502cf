use std::path::PathBuf;

use async_trait::async_trait;
use quote_core::db::{DbConfig, InspectionRepository, RepositoryError, RepositoryFactory};
use tracing::info;

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime.
///
/// Resolution order:
/// 1. **`QUOTE_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if it exists in the current working directory.
/// 3. **`$CARGO_MANIFEST_DIR/seeds`** for runs from the build tree.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("QUOTE_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust
/// use quote_core::db::RepositoryRegistry;
/// use quote_db_sqlite::SqliteRepositoryFactory;
///
/// let registry = RepositoryRegistry::new().with(SqliteRepositoryFactory);
/// assert_eq!(registry.backends(), vec!["sqlite"]);
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens `config.connection_string` (a file path or `:memory:`), runs
    /// migrations, then applies the rate seeds.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InspectionRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        repo.run_seeds(&seeds)
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(
            connection = %config.connection_string,
            seeds = %seeds.display(),
            "sqlite repository ready"
        );
        Ok(Box::new(repo))
    }
}
