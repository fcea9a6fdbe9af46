//! Signal repository.
//!
//! Writes go through a single upsert keyed by `(symbol, bucket, mode)`;
//! recomputing a bucket overwrites that row only, so historical buckets are
//! never touched by later computation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use crowd_pulse_core::DataMode;
use sqlx::PgPool;

use crate::models::SignalRecord;

#[derive(Debug, Clone)]
pub struct SignalRepository {
    pool: PgPool,
}

impl SignalRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts one signal row.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert(&self, record: &SignalRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO signals
                (symbol, bucket, sentiment_score_avg, discussion_volume,
                 sentiment_velocity, velocity_window_minutes,
                 divergence_score, divergence_direction,
                 confidence_score, model_certainty, data_sufficiency,
                 signal_consistency, computed_at, data_mode)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (symbol, bucket, data_mode) DO UPDATE
            SET sentiment_score_avg = EXCLUDED.sentiment_score_avg,
                discussion_volume = EXCLUDED.discussion_volume,
                sentiment_velocity = EXCLUDED.sentiment_velocity,
                velocity_window_minutes = EXCLUDED.velocity_window_minutes,
                divergence_score = EXCLUDED.divergence_score,
                divergence_direction = EXCLUDED.divergence_direction,
                confidence_score = EXCLUDED.confidence_score,
                model_certainty = EXCLUDED.model_certainty,
                data_sufficiency = EXCLUDED.data_sufficiency,
                signal_consistency = EXCLUDED.signal_consistency,
                computed_at = EXCLUDED.computed_at
            ",
        )
        .bind(&record.symbol)
        .bind(record.bucket)
        .bind(record.sentiment_score_avg)
        .bind(record.discussion_volume)
        .bind(record.sentiment_velocity)
        .bind(record.velocity_window_minutes)
        .bind(record.divergence_score)
        .bind(&record.divergence_direction)
        .bind(record.confidence_score)
        .bind(record.model_certainty)
        .bind(record.data_sufficiency)
        .bind(record.signal_consistency)
        .bind(record.computed_at)
        .bind(&record.data_mode)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The most recent signal row for a symbol.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn latest_by_symbol(
        &self,
        symbol: &str,
        mode: DataMode,
    ) -> Result<Option<SignalRecord>> {
        let record = sqlx::query_as::<_, SignalRecord>(
            r"
            SELECT id, symbol, bucket, sentiment_score_avg, discussion_volume,
                   sentiment_velocity, velocity_window_minutes,
                   divergence_score, divergence_direction,
                   confidence_score, model_certainty, data_sufficiency,
                   signal_consistency, computed_at, data_mode
            FROM signals
            WHERE symbol = $1 AND data_mode = $2
            ORDER BY bucket DESC
            LIMIT 1
            ",
        )
        .bind(symbol)
        .bind(mode.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Signal rows for a symbol within a time range, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_range(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mode: DataMode,
    ) -> Result<Vec<SignalRecord>> {
        let records = sqlx::query_as::<_, SignalRecord>(
            r"
            SELECT id, symbol, bucket, sentiment_score_avg, discussion_volume,
                   sentiment_velocity, velocity_window_minutes,
                   divergence_score, divergence_direction,
                   confidence_score, model_certainty, data_sufficiency,
                   signal_consistency, computed_at, data_mode
            FROM signals
            WHERE symbol = $1
              AND bucket >= $2 AND bucket <= $3
              AND data_mode = $4
            ORDER BY bucket ASC
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

    /// Latest signal row per symbol across the whole universe.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn overview(&self, mode: DataMode) -> Result<Vec<SignalRecord>> {
        let records = sqlx::query_as::<_, SignalRecord>(
            r"
            SELECT DISTINCT ON (symbol)
                   id, symbol, bucket, sentiment_score_avg, discussion_volume,
                   sentiment_velocity, velocity_window_minutes,
                   divergence_score, divergence_direction,
                   confidence_score, model_certainty, data_sufficiency,
                   signal_consistency, computed_at, data_mode
            FROM signals
            WHERE data_mode = $1
            ORDER BY symbol, bucket DESC
            ",
        )
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Divergence scores of the most recent `limit` buckets before `before`,
    /// newest first. Input to the consistency sub-score.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn recent_divergence(
        &self,
        symbol: &str,
        before: DateTime<Utc>,
        limit: i64,
        mode: DataMode,
    ) -> Result<Vec<f64>> {
        let rows: Vec<(Option<f64>,)> = sqlx::query_as(
            r"
            SELECT divergence_score
            FROM signals
            WHERE symbol = $1 AND bucket < $2 AND data_mode = $3
            ORDER BY bucket DESC
            LIMIT $4
            ",
        )
        .bind(symbol)
        .bind(before)
        .bind(mode.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(|r| r.0).collect())
    }

    /// Total signal count for a mode, for the status report.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self, mode: DataMode) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signals WHERE data_mode = $1")
            .bind(mode.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
