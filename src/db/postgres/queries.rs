use anyhow::Context;
use sqlx::PgPool;

use crate::db::repository::RepositoryError;
use crate::models::{NewProduct, Product, ProductPatch};

const SELECT_COLUMNS: &str =
    "id, name, description, price, stock, status, created_at, updated_at";

pub async fn paginate(
    pool: &PgPool,
    page: u64,
    per_page: u64,
) -> Result<(Vec<Product>, u64), RepositoryError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .context("Failed to count products")?;

    // Saturate so a hostile page number lands past the end instead of
    // overflowing; i64::MAX as an OFFSET yields an empty page.
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {} FROM products ORDER BY id LIMIT $1 OFFSET $2",
        SELECT_COLUMNS
    ))
    .bind(per_page as i64)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to query products")?;

    Ok((products, total as u64))
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Product>, RepositoryError> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {} FROM products WHERE id = $1",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to query product by id")
    .map_err(RepositoryError::from)
}

pub async fn create(pool: &PgPool, product: NewProduct) -> Result<Product, RepositoryError> {
    sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (name, description, price, stock, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        SELECT_COLUMNS
    ))
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.status)
    .fetch_one(pool)
    .await
    .context("Failed to insert product")
    .map_err(RepositoryError::from)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    patch: ProductPatch,
) -> Result<Product, RepositoryError> {
    sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            price = COALESCE($4, price),
            stock = COALESCE($5, stock),
            status = COALESCE($6, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        SELECT_COLUMNS
    ))
    .bind(id)
    .bind(patch.name)
    .bind(patch.description)
    .bind(patch.price)
    .bind(patch.stock)
    .bind(patch.status)
    .fetch_optional(pool)
    .await
    .context("Failed to update product")?
    .ok_or(RepositoryError::not_found("Product"))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete product")?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::not_found("Product"));
    }
    Ok(())
}

pub async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .context("Failed to count products")
        .map_err(RepositoryError::from)
}
