#[cfg(feature = "postgres")]
use anyhow::{Context, Result};
#[cfg(feature = "postgres")]
use sqlx::PgPool;
#[cfg(feature = "postgres")]
use tracing::info;

#[cfg(feature = "postgres")]
const MIGRATION_SQL: &str = include_str!("../../migrations/001_initial_schema.sql");

#[cfg(feature = "postgres")]
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    for (i, statement) in split_sql_statements(MIGRATION_SQL).iter().enumerate() {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| {
                format!(
                    "Failed to execute migration statement {}: {}",
                    i + 1,
                    &statement[..statement.len().min(100)]
                )
            })?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}

// Statements end on a semicolon at line end; the schema carries no function
// bodies, so no dollar-quote handling is needed.
#[cfg(feature = "postgres")]
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }

        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            statements.push(current.trim().to_string());
            current.clear();
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}

#[cfg(all(test, feature = "postgres"))]
mod tests {
    use super::*;

    #[test]
    fn test_split_sql_statements() {
        let statements = split_sql_statements(MIGRATION_SQL);
        assert_eq!(statements.len(), 3);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS products"));
        assert!(statements[1].contains("idx_products_name"));
        assert!(statements[2].contains("idx_products_status"));
    }
}
