//! Metric log repository for SQLite operations

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{MetricLogRow, MetricSample};

#[derive(sqlx::FromRow)]
struct LogRecord {
    id: String,
    endpoint: String,
    ms: i64,
    tokens: i64,
    cost_usd: f64,
    timestamp: i64,
}

impl From<LogRecord> for MetricLogRow {
    fn from(r: LogRecord) -> Self {
        Self {
            id: r.id,
            sample: MetricSample {
                endpoint: r.endpoint,
                duration_ms: r.ms.max(0) as u64,
                tokens: r.tokens.max(0) as u64,
                cost_usd: r.cost_usd,
                timestamp: DateTime::<Utc>::from_timestamp_millis(r.timestamp).unwrap_or_default(),
            },
        }
    }
}

/// Insert one sample, returning the generated id
pub async fn insert_metric_log(
    pool: &SqlitePool,
    sample: &MetricSample,
) -> Result<String, SqliteError> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO logs (id, endpoint, ms, tokens, cost_usd, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&sample.endpoint)
    .bind(i64::try_from(sample.duration_ms).unwrap_or(i64::MAX))
    .bind(i64::try_from(sample.tokens).unwrap_or(i64::MAX))
    .bind(sample.cost_usd)
    .bind(sample.timestamp.timestamp_millis())
    .execute(pool)
    .await?;

    Ok(id)
}

/// List the most recent samples, newest first
pub async fn list_metric_logs(
    pool: &SqlitePool,
    endpoint: Option<&str>,
    limit: u32,
) -> Result<Vec<MetricLogRow>, SqliteError> {
    let rows: Vec<LogRecord> = match endpoint {
        Some(endpoint) => {
            sqlx::query_as(
                r#"
                SELECT id, endpoint, ms, tokens, cost_usd, timestamp
                FROM logs
                WHERE endpoint = ?
                ORDER BY timestamp DESC, rowid DESC
                LIMIT ?
                "#,
            )
            .bind(endpoint)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT id, endpoint, ms, tokens, cost_usd, timestamp
                FROM logs
                ORDER BY timestamp DESC, rowid DESC
                LIMIT ?
                "#,
            )
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;

    #[tokio::test]
    async fn test_insert_and_list_round_trip_fields() {
        let db = SqliteService::init_in_memory().await.unwrap();
        let sample = MetricSample::new("extractMedicalData", 120, 1500, 0.003);

        let id = insert_metric_log(db.pool(), &sample).await.unwrap();
        let rows = list_metric_logs(db.pool(), None, 10).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].sample.endpoint, "extractMedicalData");
        assert_eq!(rows[0].sample.duration_ms, 120);
        assert_eq!(rows[0].sample.tokens, 1500);
        assert!((rows[0].sample.cost_usd - 0.003).abs() < 1e-12);
        assert_eq!(
            rows[0].sample.timestamp.timestamp_millis(),
            sample.timestamp.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_endpoint_and_limits() {
        let db = SqliteService::init_in_memory().await.unwrap();
        for endpoint in ["transcribeAudio", "generateDiagnosis", "transcribeAudio"] {
            insert_metric_log(db.pool(), &MetricSample::new(endpoint, 1, 0, 0.0))
                .await
                .unwrap();
        }

        let rows = list_metric_logs(db.pool(), Some("transcribeAudio"), 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.sample.endpoint == "transcribeAudio"));

        let limited = list_metric_logs(db.pool(), None, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_negative_cost_rejected_by_schema() {
        let db = SqliteService::init_in_memory().await.unwrap();
        let sample = MetricSample::new("generateDiagnosis", 1, 0, -1.0);
        assert!(insert_metric_log(db.pool(), &sample).await.is_err());
    }
}
