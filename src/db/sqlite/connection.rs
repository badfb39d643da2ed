use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use std::time::Duration;

pub type SqlitePool = Pool<SqliteConnectionManager>;

pub fn create_pool(database_path: &str) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = Path::new(database_path).parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let manager = SqliteConnectionManager::file(database_path);

    Pool::builder()
        .max_size(15) // SQLite doesn't handle as many connections as Postgres
        .connection_timeout(Duration::from_secs(30))
        .build(manager)
        .context("Failed to create SQLite connection pool")
}

pub fn test_connection(pool: &SqlitePool) -> Result<()> {
    let conn = pool.get().context("Failed to get connection from pool")?;
    conn.query_row("SELECT 1", params![], |_| Ok(()))
        .context("Failed to test database connection")?;
    Ok(())
}

pub fn init_schema(pool: &SqlitePool) -> Result<()> {
    let conn = pool.get().context("Failed to get connection from pool")?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            price REAL NOT NULL,
            stock INTEGER NOT NULL,
            status INTEGER NOT NULL DEFAULT 1,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        params![],
    )
    .context("Failed to create products table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_products_name ON products(name)",
        params![],
    )
    .context("Failed to create name index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_products_status ON products(status)",
        params![],
    )
    .context("Failed to create status index")?;

    Ok(())
}
