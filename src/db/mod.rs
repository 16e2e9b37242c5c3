// Database module - provides data access layer

use std::str::FromStr;

use color_eyre::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

// Re-export models for convenience
pub mod models;
pub use models::*;

// Internal modules
mod question;
mod response;
mod schema;
mod survey;

// Main database handle
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        // Verify connection
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await?;
        assert_eq!(one, 1);

        // Initialize schema
        schema::create_schema(&pool).await?;

        tracing::info!("database connection has been verified");

        Ok(Self { pool })
    }
}
