use async_trait::async_trait;
use thiserror::Error;

use crate::errors::ApiError;
use crate::models::{NewProduct, Product, ProductPatch};

/// Errors surfaced by the persistence layer.
///
/// `NotFound` carries the resource type identifier so the error classifier
/// can interpolate a human-readable name into the client message; everything
/// else is wrapped untyped and classified as an internal failure.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Other(err.into())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { resource } => ApiError::NotFound { resource },
            RepositoryError::Other(source) => ApiError::internal(source),
        }
    }
}

/// Persistence contract for products, abstracting PostgreSQL and SQLite
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch one page of products ordered by id, plus the total row count
    async fn paginate(&self, page: u64, per_page: u64) -> Result<(Vec<Product>, u64), RepositoryError>;

    /// Get a product by id
    async fn find(&self, id: i64) -> Result<Option<Product>, RepositoryError>;

    /// Insert a product and return the stored row
    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Apply a partial update and return the stored row
    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, RepositoryError>;

    /// Delete a product by id
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Total number of products
    async fn count(&self) -> Result<i64, RepositoryError>;

    /// Test the backing connection
    async fn test_connection(&self) -> Result<(), RepositoryError>;
}
