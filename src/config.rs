use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// When enabled, 500 responses carry diagnostic detail (APP_DEBUG)
    pub debug: bool,
    /// Bearer token required for mutating endpoints; unset leaves writes open
    pub write_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string, or the SQLite file path for the
    /// default backend
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            database: DatabaseConfig {
                url: Self::database_url()?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            },
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            debug: env::var("APP_DEBUG")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("APP_DEBUG must be true or false")?,
            write_token: env::var("API_WRITE_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(feature = "postgres")]
    fn database_url() -> Result<String> {
        env::var("DATABASE_URL").context("DATABASE_URL must be set")
    }

    #[cfg(not(feature = "postgres"))]
    fn database_url() -> Result<String> {
        Ok(env::var("DATABASE_URL").unwrap_or_else(|_| "./data/products.db".to_string()))
    }
}
