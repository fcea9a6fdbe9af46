//! Sentiment record repository.

use anyhow::Result;
use chrono::{DateTime, Utc};
use crowd_pulse_core::DataMode;
use sqlx::PgPool;

use crate::models::SentimentRecordRow;

#[derive(Debug, Clone)]
pub struct SentimentRepository {
    pool: PgPool,
}

impl SentimentRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a batch of scored records. A post already scored under the
    /// same model version is left untouched (history is never mutated).
    /// Returns the number of newly inserted rows.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn insert_batch(&self, records: &[SentimentRecordRow]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0u64;
        let mut tx = self.pool.begin().await?;

        for record in records {
            let result = sqlx::query(
                r"
                INSERT INTO sentiment_records
                    (post_id, symbol, label, score, model_version, scored_at, data_mode)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (post_id, model_version) DO NOTHING
                ",
            )
            .bind(record.post_id)
            .bind(&record.symbol)
            .bind(&record.label)
            .bind(record.score)
            .bind(&record.model_version)
            .bind(record.scored_at)
            .bind(&record.data_mode)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Queries scored records for a symbol within a time range, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_symbol(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mode: DataMode,
    ) -> Result<Vec<SentimentRecordRow>> {
        let records = sqlx::query_as::<_, SentimentRecordRow>(
            r"
            SELECT id, post_id, symbol, label, score, model_version, scored_at, data_mode
            FROM sentiment_records
            WHERE symbol = $1
              AND scored_at >= $2 AND scored_at <= $3
              AND data_mode = $4
            ORDER BY scored_at ASC
            ",
        )
        .bind(symbol)
        .bind(start)
        .bind(end)
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Label distribution over a time range, across all symbols.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn label_distribution(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mode: DataMode,
    ) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r"
            SELECT label, COUNT(*)
            FROM sentiment_records
            WHERE scored_at >= $1 AND scored_at <= $2 AND data_mode = $3
            GROUP BY label
            ",
        )
        .bind(start)
        .bind(end)
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Total scored count for a mode, for the status report.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self, mode: DataMode) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sentiment_records WHERE data_mode = $1")
                .bind(mode.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_pulse_core::SentimentLabel;

    #[test]
    fn record_ready_for_insertion_has_no_id() {
        let record = SentimentRecordRow::new(
            7,
            Some("ITC".to_string()),
            SentimentLabel::Positive,
            0.91,
            "lexicon-v1",
            Utc::now(),
            DataMode::Test,
        );
        assert!(record.id.is_none());
        assert_eq!(record.label, "positive");
    }

    #[test]
    fn time_range_filtering_logic() {
        let now = Utc::now();
        let start = now - chrono::Duration::hours(2);
        let within = now - chrono::Duration::hours(1);
        assert!(within >= start && within <= now);
    }
}
