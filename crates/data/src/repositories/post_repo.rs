//! Social post repository.
//!
//! Insertions are idempotent on `(source, source_id)` so re-running a
//! window never duplicates rows.

use anyhow::Result;
use crowd_pulse_core::DataMode;
use sqlx::PgPool;

use crate::models::SocialPostRecord;

#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a batch of posts, skipping rows already present by the
    /// dedup key. Returns the number of newly inserted rows.
    ///
    /// # Errors
    /// Returns an error if the database transaction fails.
    pub async fn insert_batch(&self, records: &[SocialPostRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0u64;
        let mut tx = self.pool.begin().await?;

        for record in records {
            let result = sqlx::query(
                r"
                INSERT INTO social_posts
                    (source, symbol, raw_text, cleaned_text, author, source_id,
                     posted_at, data_mode)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (source, source_id) DO NOTHING
                ",
            )
            .bind(&record.source)
            .bind(&record.symbol)
            .bind(&record.raw_text)
            .bind(&record.cleaned_text)
            .bind(&record.author)
            .bind(&record.source_id)
            .bind(record.posted_at)
            .bind(&record.data_mode)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Queries posts not yet scored under the given model, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_unscored(
        &self,
        model_version: &str,
        mode: DataMode,
        limit: i64,
    ) -> Result<Vec<SocialPostRecord>> {
        let records = sqlx::query_as::<_, SocialPostRecord>(
            r"
            SELECT p.id, p.source, p.symbol, p.raw_text, p.cleaned_text, p.author,
                   p.source_id, p.posted_at, p.ingested_at, p.data_mode
            FROM social_posts p
            WHERE p.data_mode = $1
              AND NOT EXISTS (
                  SELECT 1 FROM sentiment_records s
                  WHERE s.post_id = p.id AND s.model_version = $2
              )
            ORDER BY p.posted_at ASC NULLS LAST
            LIMIT $3
            ",
        )
        .bind(mode.as_str())
        .bind(model_version)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Updates the normalised text and attributed symbol of a post.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn update_normalisation(
        &self,
        id: i64,
        cleaned_text: &str,
        symbol: &str,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE social_posts
            SET cleaned_text = $1,
                symbol = COALESCE(symbol, $2)
            WHERE id = $3
            ",
        )
        .bind(cleaned_text)
        .bind(symbol)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Total post count for a mode, for the status report.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self, mode: DataMode) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM social_posts WHERE data_mode = $1")
                .bind(mode.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }
}
