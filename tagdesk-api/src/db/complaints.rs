//! Complaint database operations

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::BTreeMap;
use tagdesk_common::db::{Category, Complaint, ComplaintStatus, NewComplaint, Sentiment};
use tagdesk_common::{Error, Result};
use utoipa::ToSchema;

const COLUMNS: &str = "id, customer_id, message, email, category, sentiment, sentiment_score, status, created_at, updated_at";

/// Optional list filters (all conditions must match)
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplaintFilter {
    pub category: Option<Category>,
    pub sentiment: Option<Sentiment>,
    pub status: Option<ComplaintStatus>,
}

/// Complaint counts per category, sentiment and status
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComplaintStats {
    pub total: i64,
    pub by_category: BTreeMap<String, i64>,
    pub by_sentiment: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

fn row_to_complaint(row: &SqliteRow) -> Result<Complaint> {
    let category: String = row.try_get("category")?;
    let sentiment: String = row.try_get("sentiment")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Complaint {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        message: row.try_get("message")?,
        email: row.try_get("email")?,
        category: category.parse()?,
        sentiment: sentiment.parse()?,
        sentiment_score: row.try_get("sentiment_score")?,
        status: status.parse()?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

/// Persist a tagged complaint, returning the stored record
pub async fn insert_complaint(pool: &SqlitePool, new: &NewComplaint) -> Result<Complaint> {
    let now = timestamp(Utc::now());

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO complaints (
            customer_id, message, email, category, sentiment, sentiment_score,
            status, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(new.customer_id)
    .bind(&new.message)
    .bind(&new.email)
    .bind(new.category.as_str())
    .bind(new.sentiment.as_str())
    .bind(new.sentiment_score)
    .bind(ComplaintStatus::Open.as_str())
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    row_to_complaint(&row)
}

/// Load one complaint
pub async fn get_complaint(pool: &SqlitePool, id: i64) -> Result<Option<Complaint>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM complaints WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_complaint).transpose()
}

/// List complaints matching `filter`, newest first
pub async fn list_complaints(
    pool: &SqlitePool,
    filter: &ComplaintFilter,
    limit: i64,
) -> Result<Vec<Complaint>> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM complaints WHERE 1 = 1"));

    if let Some(category) = filter.category {
        query.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(sentiment) = filter.sentiment {
        query.push(" AND sentiment = ").push_bind(sentiment.as_str());
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit);

    let rows = query.build().fetch_all(pool).await?;
    rows.iter().map(row_to_complaint).collect()
}

/// Strongly negative complaints that are not closed
///
/// Ordered by sentiment score (most negative first), then newest first.
pub async fn list_urgent(pool: &SqlitePool, threshold: f64, limit: i64) -> Result<Vec<Complaint>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {COLUMNS} FROM complaints
        WHERE sentiment = ? AND sentiment_score >= ? AND status != ?
        ORDER BY sentiment_score DESC, created_at DESC, id DESC
        LIMIT ?
        "#
    ))
    .bind(Sentiment::Negative.as_str())
    .bind(threshold)
    .bind(ComplaintStatus::Closed.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_complaint).collect()
}

/// Change a complaint's lifecycle status
///
/// Returns `None` when the complaint does not exist.
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: ComplaintStatus,
) -> Result<Option<Complaint>> {
    let row = sqlx::query(&format!(
        "UPDATE complaints SET status = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(timestamp(Utc::now()))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_complaint).transpose()
}

/// Delete a complaint, returning whether it existed
pub async fn delete_complaint(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM complaints WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count complaints per category, sentiment and status
///
/// Every enumeration value is present in the maps, with 0 when unused.
pub async fn complaint_stats(pool: &SqlitePool) -> Result<ComplaintStats> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM complaints")
        .fetch_one(pool)
        .await?;

    let by_category = grouped_counts(pool, "category", Category::ALL.iter().map(|c| c.as_str())).await?;
    let by_sentiment =
        grouped_counts(pool, "sentiment", Sentiment::ALL.iter().map(|s| s.as_str())).await?;
    let by_status =
        grouped_counts(pool, "status", ComplaintStatus::ALL.iter().map(|s| s.as_str())).await?;

    Ok(ComplaintStats {
        total,
        by_category,
        by_sentiment,
        by_status,
    })
}

/// `column` is one of the fixed enumeration columns, never user input
async fn grouped_counts(
    pool: &SqlitePool,
    column: &str,
    keys: impl Iterator<Item = &'static str>,
) -> Result<BTreeMap<String, i64>> {
    let mut counts: BTreeMap<String, i64> = keys.map(|k| (k.to_string(), 0)).collect();

    let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
        "SELECT {column}, COUNT(*) FROM complaints GROUP BY {column}"
    ))
    .fetch_all(pool)
    .await?;

    for (key, count) in rows {
        counts.insert(key, count);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagdesk_common::db::init_memory_database;

    fn new_complaint(customer_id: i64, category: Category, sentiment: Sentiment, score: f64) -> NewComplaint {
        NewComplaint {
            customer_id,
            message: format!("Complaint from customer {}", customer_id),
            email: format!("customer{}@example.com", customer_id),
            category,
            sentiment,
            sentiment_score: score,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let pool = init_memory_database().await.unwrap();
        let stored = insert_complaint(&pool, &new_complaint(5, Category::Billing, Sentiment::Negative, 0.9))
            .await
            .unwrap();

        assert!(stored.id > 0);
        assert_eq!(stored.status, ComplaintStatus::Open);
        assert_eq!(stored.created_at, stored.updated_at);

        let loaded = get_complaint(&pool, stored.id).await.unwrap().unwrap();
        assert_eq!(loaded, stored);
        assert!(get_complaint(&pool, stored.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_order() {
        let pool = init_memory_database().await.unwrap();
        let first = insert_complaint(&pool, &new_complaint(1, Category::Billing, Sentiment::Negative, 0.9))
            .await
            .unwrap();
        insert_complaint(&pool, &new_complaint(2, Category::Delivery, Sentiment::Neutral, 0.5))
            .await
            .unwrap();
        let third = insert_complaint(&pool, &new_complaint(3, Category::Billing, Sentiment::Positive, 0.8))
            .await
            .unwrap();

        let all = list_complaints(&pool, &ComplaintFilter::default(), 100).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, third.id, "newest first");

        let billing = ComplaintFilter {
            category: Some(Category::Billing),
            ..Default::default()
        };
        let rows = list_complaints(&pool, &billing, 100).await.unwrap();
        assert_eq!(rows.iter().map(|c| c.id).collect::<Vec<_>>(), vec![third.id, first.id]);

        let billing_negative = ComplaintFilter {
            sentiment: Some(Sentiment::Negative),
            ..billing
        };
        let rows = list_complaints(&pool, &billing_negative, 100).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, first.id);

        let limited = list_complaints(&pool, &ComplaintFilter::default(), 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_urgent_excludes_closed_and_weak() {
        let pool = init_memory_database().await.unwrap();
        let strong = insert_complaint(&pool, &new_complaint(1, Category::Technical, Sentiment::Negative, 0.95))
            .await
            .unwrap();
        let medium = insert_complaint(&pool, &new_complaint(2, Category::Billing, Sentiment::Negative, 0.85))
            .await
            .unwrap();
        insert_complaint(&pool, &new_complaint(3, Category::Billing, Sentiment::Negative, 0.7))
            .await
            .unwrap();
        insert_complaint(&pool, &new_complaint(4, Category::Billing, Sentiment::Positive, 0.99))
            .await
            .unwrap();
        let closed = insert_complaint(&pool, &new_complaint(5, Category::Delivery, Sentiment::Negative, 0.99))
            .await
            .unwrap();
        update_status(&pool, closed.id, ComplaintStatus::Closed).await.unwrap();

        let urgent = list_urgent(&pool, 0.8, 10).await.unwrap();
        assert_eq!(urgent.iter().map(|c| c.id).collect::<Vec<_>>(), vec![strong.id, medium.id]);
    }

    #[tokio::test]
    async fn test_update_status() {
        let pool = init_memory_database().await.unwrap();
        let inserted = insert_complaint(&pool, &new_complaint(1, Category::Product, Sentiment::Negative, 0.9))
            .await
            .unwrap();
        sqlx::query("UPDATE complaints SET created_at = ?, updated_at = ? WHERE id = ?")
            .bind("2020-01-01T00:00:00.000000Z")
            .bind("2020-01-01T00:00:00.000000Z")
            .bind(inserted.id)
            .execute(&pool)
            .await
            .unwrap();
        let stored = get_complaint(&pool, inserted.id).await.unwrap().unwrap();

        let updated = update_status(&pool, stored.id, ComplaintStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ComplaintStatus::InProgress);
        assert!(updated.updated_at > stored.updated_at, "updated_at must move forward");
        assert_eq!(updated.created_at, stored.created_at);

        let reloaded = get_complaint(&pool, stored.id).await.unwrap().unwrap();
        assert_eq!(reloaded, updated);

        assert!(update_status(&pool, 999, ComplaintStatus::Closed).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = init_memory_database().await.unwrap();
        let stored = insert_complaint(&pool, &new_complaint(1, Category::Account, Sentiment::Neutral, 0.5))
            .await
            .unwrap();

        assert!(delete_complaint(&pool, stored.id).await.unwrap());
        assert!(!delete_complaint(&pool, stored.id).await.unwrap());
        assert!(get_complaint(&pool, stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_include_zero_buckets() {
        let pool = init_memory_database().await.unwrap();
        insert_complaint(&pool, &new_complaint(1, Category::Billing, Sentiment::Negative, 0.9))
            .await
            .unwrap();
        insert_complaint(&pool, &new_complaint(2, Category::Billing, Sentiment::Neutral, 0.5))
            .await
            .unwrap();

        let stats = complaint_stats(&pool).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_category["BILLING"], 2);
        assert_eq!(stats.by_category["OTHER"], 0);
        assert_eq!(stats.by_category.len(), 6);
        assert_eq!(stats.by_sentiment["NEGATIVE"], 1);
        assert_eq!(stats.by_sentiment["POSITIVE"], 0);
        assert_eq!(stats.by_status["OPEN"], 2);
        assert_eq!(stats.by_status["CLOSED"], 0);
    }
}
