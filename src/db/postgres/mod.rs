pub mod connection;
pub mod queries;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::repository::{ProductRepository, RepositoryError};
use crate::models::{NewProduct, Product, ProductPatch};

pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductRepository for PostgresRepository {
    async fn paginate(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        queries::paginate(&self.pool, page, per_page).await
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        queries::find(&self.pool, id).await
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        queries::create(&self.pool, product).await
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, RepositoryError> {
        queries::update(&self.pool, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        queries::delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        queries::count(&self.pool).await
    }

    async fn test_connection(&self) -> Result<(), RepositoryError> {
        connection::test_connection(&self.pool)
            .await
            .map_err(RepositoryError::from)
    }
}
