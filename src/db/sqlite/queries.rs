use anyhow::Context;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::repository::RepositoryError;
use crate::db::sqlite::connection::SqlitePool;
use crate::models::{NewProduct, Product, ProductPatch};

const SELECT_COLUMNS: &str =
    "id, name, description, price, stock, status, created_at, updated_at";

fn row_to_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: row.get("price")?,
        stock: row.get("stock")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn paginate(
    pool: &SqlitePool,
    page: u64,
    per_page: u64,
) -> Result<(Vec<Product>, u64), RepositoryError> {
    let conn = pool.get().context("Failed to get connection from pool")?;

    let total: u64 = conn
        .query_row("SELECT COUNT(*) FROM products", params![], |row| row.get(0))
        .context("Failed to count products")?;

    // Saturate so a hostile page number lands past the end instead of
    // overflowing; i64::MAX as an OFFSET yields an empty page.
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM products ORDER BY id LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS
        ))
        .context("Failed to prepare pagination query")?;

    let products = stmt
        .query_map(params![per_page as i64, offset], row_to_product)
        .context("Failed to query products")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read product rows")?;

    Ok((products, total))
}

pub fn find(pool: &SqlitePool, id: i64) -> Result<Option<Product>, RepositoryError> {
    let conn = pool.get().context("Failed to get connection from pool")?;

    let product = conn
        .query_row(
            &format!("SELECT {} FROM products WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            row_to_product,
        )
        .optional()
        .context("Failed to query product by id")?;

    Ok(product)
}

pub fn create(pool: &SqlitePool, product: NewProduct) -> Result<Product, RepositoryError> {
    let conn = pool.get().context("Failed to get connection from pool")?;

    conn.execute(
        r#"
        INSERT INTO products (name, description, price, stock, status)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            product.name,
            product.description,
            product.price,
            product.stock,
            product.status,
        ],
    )
    .context("Failed to insert product")?;

    let id = conn.last_insert_rowid();
    conn.query_row(
        &format!("SELECT {} FROM products WHERE id = ?1", SELECT_COLUMNS),
        params![id],
        row_to_product,
    )
    .context("Failed to read back inserted product")
    .map_err(RepositoryError::from)
}

pub fn update(
    pool: &SqlitePool,
    id: i64,
    patch: ProductPatch,
) -> Result<Product, RepositoryError> {
    let mut conn = pool.get().context("Failed to get connection from pool")?;
    let tx = conn.transaction().context("Failed to begin transaction")?;

    let existing = tx
        .query_row(
            &format!("SELECT {} FROM products WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            row_to_product,
        )
        .optional()
        .context("Failed to query product for update")?
        .ok_or(RepositoryError::not_found("Product"))?;

    tx.execute(
        r#"
        UPDATE products SET
            name = ?2,
            description = ?3,
            price = ?4,
            stock = ?5,
            status = ?6,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?1
        "#,
        params![
            id,
            patch.name.unwrap_or(existing.name),
            patch.description.unwrap_or(existing.description),
            patch.price.unwrap_or(existing.price),
            patch.stock.unwrap_or(existing.stock),
            patch.status.unwrap_or(existing.status),
        ],
    )
    .context("Failed to update product")?;

    let updated = tx
        .query_row(
            &format!("SELECT {} FROM products WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            row_to_product,
        )
        .context("Failed to read back updated product")?;

    tx.commit().context("Failed to commit transaction")?;
    Ok(updated)
}

pub fn delete(pool: &SqlitePool, id: i64) -> Result<(), RepositoryError> {
    let conn = pool.get().context("Failed to get connection from pool")?;

    let affected = conn
        .execute("DELETE FROM products WHERE id = ?1", params![id])
        .context("Failed to delete product")?;

    if affected == 0 {
        return Err(RepositoryError::not_found("Product"));
    }
    Ok(())
}

pub fn count(pool: &SqlitePool) -> Result<i64, RepositoryError> {
    let conn = pool.get().context("Failed to get connection from pool")?;

    conn.query_row("SELECT COUNT(*) FROM products", params![], |row| row.get(0))
        .context("Failed to count products")
        .map_err(RepositoryError::from)
}
