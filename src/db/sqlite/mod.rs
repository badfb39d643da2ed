pub mod connection;
pub mod queries;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::repository::{ProductRepository, RepositoryError};
use crate::db::sqlite::connection::SqlitePool;
use crate::models::{NewProduct, Product, ProductPatch};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Result<Self> {
        // Initialize schema on creation
        connection::init_schema(&pool)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// rusqlite is synchronous, so every call moves onto the blocking pool.
#[async_trait]
impl ProductRepository for SqliteRepository {
    async fn paginate(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::paginate(&pool, page, per_page)).await?
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::find(&pool, id)).await?
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::create(&pool, product)).await?
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, RepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::update(&pool, id, patch)).await?
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::delete(&pool, id)).await?
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::count(&pool)).await?
    }

    async fn test_connection(&self) -> Result<(), RepositoryError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            connection::test_connection(&pool).map_err(RepositoryError::from)
        })
        .await?
    }
}
