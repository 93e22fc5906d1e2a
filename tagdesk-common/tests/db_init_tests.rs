//! Database initialization tests
//!
//! Verifies schema creation, idempotency, and the CHECK constraints that
//! keep partially tagged complaints out of the table.

use tagdesk_common::db::{create_complaints_table, init_database, init_memory_database};
use tempfile::TempDir;

async fn insert_raw(
    pool: &sqlx::SqlitePool,
    customer_id: i64,
    category: &str,
    sentiment: &str,
    score: f64,
) -> Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error> {
    sqlx::query(
        "INSERT INTO complaints (customer_id, message, email, category, sentiment, sentiment_score, created_at, updated_at)
         VALUES (?, 'The parcel never arrived', 'a@b.co', ?, ?, ?, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .bind(customer_id)
    .bind(category)
    .bind(sentiment)
    .bind(score)
    .execute(pool)
    .await
}

#[tokio::test]
async fn test_init_creates_database_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("tagdesk.db");

    let pool = init_database(&db_path).await.expect("init database");
    assert!(db_path.exists(), "database file should be created");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'complaints'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("tagdesk.db");

    let pool = init_database(&db_path).await.unwrap();
    insert_raw(&pool, 1, "BILLING", "NEGATIVE", 0.9).await.unwrap();
    pool.close().await;

    // Reopening must keep existing rows
    let pool = init_database(&db_path).await.unwrap();
    create_complaints_table(&pool).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM complaints")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_default_status_is_open() {
    let pool = init_memory_database().await.unwrap();
    insert_raw(&pool, 7, "DELIVERY", "NEUTRAL", 0.5).await.unwrap();

    let status: String = sqlx::query_scalar("SELECT status FROM complaints WHERE customer_id = 7")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "OPEN");
}

#[tokio::test]
async fn test_check_constraints_reject_invalid_rows() {
    let pool = init_memory_database().await.unwrap();

    assert!(insert_raw(&pool, 0, "BILLING", "NEGATIVE", 0.9).await.is_err(), "customer_id must be > 0");
    assert!(insert_raw(&pool, 1, "SHOES", "NEGATIVE", 0.9).await.is_err(), "unknown category");
    assert!(insert_raw(&pool, 1, "BILLING", "ANGRY", 0.9).await.is_err(), "unknown sentiment");
    assert!(insert_raw(&pool, 1, "BILLING", "NEGATIVE", 1.2).await.is_err(), "score above 1");
    assert!(insert_raw(&pool, 1, "BILLING", "NEGATIVE", 0.9).await.is_ok());
}
