//! Pool construction and schema bootstrap.

use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Connects to the `PostgreSQL` database.
///
/// # Errors
/// Returns an error if the database connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates all tables and indexes if they do not exist.
///
/// # Errors
/// Returns an error if any DDL statement fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing database schema");

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS social_posts (
            id          BIGSERIAL PRIMARY KEY,
            source      TEXT NOT NULL,
            symbol      TEXT,
            raw_text    TEXT NOT NULL,
            cleaned_text TEXT,
            author      TEXT,
            source_id   TEXT NOT NULL,
            posted_at   TIMESTAMPTZ,
            ingested_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            data_mode   TEXT NOT NULL DEFAULT 'test',
            UNIQUE (source, source_id)
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS sentiment_records (
            id            BIGSERIAL PRIMARY KEY,
            post_id       BIGINT NOT NULL REFERENCES social_posts(id),
            symbol        TEXT,
            label         TEXT NOT NULL,
            score         DOUBLE PRECISION NOT NULL,
            model_version TEXT NOT NULL,
            scored_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
            data_mode     TEXT NOT NULL DEFAULT 'test',
            UNIQUE (post_id, model_version)
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS market_data (
            id              BIGSERIAL PRIMARY KEY,
            symbol          TEXT NOT NULL,
            date            TIMESTAMPTZ NOT NULL,
            open            NUMERIC,
            high            NUMERIC,
            low             NUMERIC,
            close           NUMERIC,
            volume          BIGINT,
            delivery_volume BIGINT,
            delivery_pct    DOUBLE PRECISION,
            fetched_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
            data_mode       TEXT NOT NULL DEFAULT 'test',
            UNIQUE (symbol, date, data_mode)
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS signals (
            id                      BIGSERIAL PRIMARY KEY,
            symbol                  TEXT NOT NULL,
            bucket                  TIMESTAMPTZ NOT NULL,
            sentiment_score_avg     DOUBLE PRECISION,
            discussion_volume       INTEGER,
            sentiment_velocity      DOUBLE PRECISION,
            velocity_window_minutes INTEGER,
            divergence_score        DOUBLE PRECISION,
            divergence_direction    TEXT,
            confidence_score        DOUBLE PRECISION,
            model_certainty         DOUBLE PRECISION,
            data_sufficiency        DOUBLE PRECISION,
            signal_consistency      DOUBLE PRECISION,
            computed_at             TIMESTAMPTZ NOT NULL DEFAULT now(),
            data_mode               TEXT NOT NULL DEFAULT 'test',
            UNIQUE (symbol, bucket, data_mode)
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS api_usage_log (
            id               BIGSERIAL PRIMARY KEY,
            service          TEXT NOT NULL,
            endpoint         TEXT,
            status           TEXT NOT NULL DEFAULT 'success',
            response_time_ms DOUBLE PRECISION,
            records_fetched  INTEGER NOT NULL DEFAULT 0,
            error_message    TEXT,
            daily_count      INTEGER,
            daily_limit      INTEGER,
            called_at        TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        ",
    )
    .execute(pool)
    .await?;

    for ddl in [
        "CREATE INDEX IF NOT EXISTS idx_posts_symbol ON social_posts (symbol)",
        "CREATE INDEX IF NOT EXISTS idx_sentiment_symbol_scored ON sentiment_records (symbol, scored_at)",
        "CREATE INDEX IF NOT EXISTS idx_market_symbol_date ON market_data (symbol, date)",
        "CREATE INDEX IF NOT EXISTS idx_signals_symbol_bucket ON signals (symbol, bucket)",
        "CREATE INDEX IF NOT EXISTS idx_usage_service_called ON api_usage_log (service, called_at)",
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("Database ready");
    Ok(())
}
