use async_trait::async_trait;
use std::time::Instant;

use crate::db::repository::{ProductRepository, RepositoryError};
use crate::db::Repository;
use crate::metrics::registry::{
    DATABASE_QUERIES_TOTAL, DATABASE_QUERY_DURATION_SECONDS, PRODUCTS_TOTAL,
};
use crate::models::{NewProduct, Product, ProductPatch};

/// A thin wrapper around a ProductRepository that records basic Prometheus
/// metrics for query counts and durations.
///
/// This keeps performance instrumentation centralized and avoids sprinkling
/// timing code across the backend implementations.
pub struct InstrumentedRepository {
    inner: Repository,
}

impl InstrumentedRepository {
    pub fn new(inner: Repository) -> Self {
        Self { inner }
    }

    fn observe(&self, query_type: &'static str, start: Instant) {
        let seconds = start.elapsed().as_secs_f64();
        DATABASE_QUERIES_TOTAL
            .with_label_values(&[query_type])
            .inc();
        DATABASE_QUERY_DURATION_SECONDS
            .with_label_values(&[query_type])
            .observe(seconds);
    }
}

#[async_trait]
impl ProductRepository for InstrumentedRepository {
    async fn paginate(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let start = Instant::now();
        let res = self.inner.paginate(page, per_page).await;
        self.observe("select", start);
        if let Ok((_, total)) = &res {
            PRODUCTS_TOTAL.set(*total as i64);
        }
        res
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let start = Instant::now();
        let res = self.inner.find(id).await;
        self.observe("select", start);
        res
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let start = Instant::now();
        let res = self.inner.create(product).await;
        self.observe("insert", start);
        if res.is_ok() {
            PRODUCTS_TOTAL.inc();
        }
        res
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, RepositoryError> {
        let start = Instant::now();
        let res = self.inner.update(id, patch).await;
        self.observe("update", start);
        res
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let start = Instant::now();
        let res = self.inner.delete(id).await;
        self.observe("delete", start);
        if res.is_ok() {
            PRODUCTS_TOTAL.dec();
        }
        res
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let start = Instant::now();
        let res = self.inner.count().await;
        self.observe("select", start);
        if let Ok(total) = &res {
            PRODUCTS_TOTAL.set(*total);
        }
        res
    }

    async fn test_connection(&self) -> Result<(), RepositoryError> {
        let start = Instant::now();
        let res = self.inner.test_connection().await;
        self.observe("select", start);
        res
    }
}
