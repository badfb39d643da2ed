pub mod instrumented;
pub mod repository;
pub mod schema;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use anyhow::Result;
use std::sync::Arc;

#[cfg(feature = "postgres")]
pub use postgres::PostgresRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;

pub use instrumented::InstrumentedRepository;
pub use repository::{ProductRepository, RepositoryError};

/// Shared repository handle - polymorphic over backends
pub type Repository = Arc<dyn ProductRepository>;

/// Initialize the repository backend based on configuration.
/// PostgreSQL takes precedence when both backend features are enabled.
#[cfg(feature = "postgres")]
pub async fn init_repository(config: &crate::config::DatabaseConfig) -> Result<Repository> {
    tracing::info!("Initializing PostgreSQL backend");
    let pool = postgres::connection::create_pool(config).await?;
    postgres::connection::test_connection(&pool).await?;
    schema::run_migrations(&pool).await?;
    Ok(Arc::new(PostgresRepository::new(pool)) as Repository)
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
pub async fn init_repository(config: &crate::config::DatabaseConfig) -> Result<Repository> {
    tracing::info!("Initializing SQLite backend");
    let pool = sqlite::connection::create_pool(&config.url)?;
    let backend = SqliteRepository::new(pool)?;
    Ok(Arc::new(backend) as Repository)
}
