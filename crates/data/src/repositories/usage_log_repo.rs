//! API usage audit log repository. Append-only.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::UsageLogRecord;

#[derive(Debug, Clone)]
pub struct UsageLogRepository {
    pool: PgPool,
}

impl UsageLogRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends one audit entry.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn append(&self, record: &UsageLogRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO api_usage_log
                (service, endpoint, status, response_time_ms, records_fetched,
                 error_message, daily_count, daily_limit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(&record.service)
        .bind(&record.endpoint)
        .bind(&record.status)
        .bind(record.response_time_ms)
        .bind(record.records_fetched)
        .bind(&record.error_message)
        .bind(record.daily_count)
        .bind(record.daily_limit)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The most recent `limit` audit entries for a service, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn recent(&self, service: &str, limit: i64) -> Result<Vec<UsageLogRecord>> {
        let records = sqlx::query_as::<_, UsageLogRecord>(
            r"
            SELECT id, service, endpoint, status, response_time_ms, records_fetched,
                   error_message, daily_count, daily_limit, called_at
            FROM api_usage_log
            WHERE service = $1
            ORDER BY called_at DESC
            LIMIT $2
            ",
        )
        .bind(service)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_struct_is_constructible() {
        assert!(std::mem::size_of::<UsageLogRepository>() > 0);
    }
}
