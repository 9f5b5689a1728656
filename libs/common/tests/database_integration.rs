//! Integration tests for the database infrastructure
//!
//! These tests verify that the PostgreSQL pool is properly configured and
//! accessible. They need a reachable database, so they are ignored by
//! default; run them with `cargo test -- --ignored` against a local
//! PostgreSQL.

use common::database::{DatabaseConfig, health_check, init_pool};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_pool_connects_and_queries() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    Ok(())
}
