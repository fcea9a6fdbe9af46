//! Market data repository.

use anyhow::Result;
use chrono::{DateTime, Utc};
use crowd_pulse_core::DataMode;
use sqlx::PgPool;

use crate::models::MarketDataRecord;

#[derive(Debug, Clone)]
pub struct MarketRepository {
    pool: PgPool,
}

impl MarketRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a batch of daily bars keyed by `(symbol, date, mode)`.
    /// Re-fetched days overwrite the non-key fields.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn upsert_batch(&self, records: &[MarketDataRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut written = 0u64;
        let mut tx = self.pool.begin().await?;

        for record in records {
            let result = sqlx::query(
                r"
                INSERT INTO market_data
                    (symbol, date, open, high, low, close, volume,
                     delivery_volume, delivery_pct, data_mode)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (symbol, date, data_mode) DO UPDATE
                SET open = EXCLUDED.open,
                    high = EXCLUDED.high,
                    low = EXCLUDED.low,
                    close = EXCLUDED.close,
                    volume = EXCLUDED.volume,
                    delivery_volume = EXCLUDED.delivery_volume,
                    delivery_pct = EXCLUDED.delivery_pct,
                    fetched_at = now()
                ",
            )
            .bind(&record.symbol)
            .bind(record.date)
            .bind(record.open)
            .bind(record.high)
            .bind(record.low)
            .bind(record.close)
            .bind(record.volume)
            .bind(record.delivery_volume)
            .bind(record.delivery_pct)
            .bind(&record.data_mode)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    /// Queries bars with known delivery volume for a symbol within a time
    /// range, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_with_delivery(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mode: DataMode,
    ) -> Result<Vec<MarketDataRecord>> {
        let records = sqlx::query_as::<_, MarketDataRecord>(
            r"
            SELECT id, symbol, date, open, high, low, close, volume,
                   delivery_volume, delivery_pct, fetched_at, data_mode
            FROM market_data
            WHERE symbol = $1
              AND date >= $2 AND date <= $3
              AND data_mode = $4
              AND delivery_volume IS NOT NULL
            ORDER BY date ASC
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

    /// Total bar count for a mode, for the status report.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self, mode: DataMode) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM market_data WHERE data_mode = $1")
                .bind(mode.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }
}
