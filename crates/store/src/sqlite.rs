use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::info;

use common::{Error, Result, Tick, TickStore};

/// SQLite-backed tick series.
///
/// Decimals round-trip through TEXT columns. The pool is cheap to clone and
/// can be shared with other readers.
#[derive(Clone)]
pub struct SqliteTickStore {
    pool: SqlitePool,
}

impl SqliteTickStore {
    /// Open (creating if missing) a database file and apply migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!(url = %database_url, "Tick store ready");
        Ok(store)
    }

    /// Private in-memory database on a single pinned connection.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TickStore for SqliteTickStore {
    async fn insert_tick(&self, tick: &Tick) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ticks (instrument, price_exact, price_value, currency, observed_at, ingested_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&tick.instrument)
        .bind(&tick.price_exact)
        .bind(tick.price_value.to_string())
        .bind(&tick.currency)
        .bind(tick.observed_at)
        .bind(tick.ingested_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_tick(&self, instrument: &str) -> Result<Option<Tick>> {
        let row = sqlx::query_as::<_, TickRow>(
            r#"
            SELECT instrument, price_exact, price_value, currency, observed_at, ingested_at
            FROM ticks
            WHERE instrument = ?1
            ORDER BY observed_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(instrument)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Tick::try_from).transpose()
    }

    async fn ticks_since(&self, instrument: &str, since: i64) -> Result<Vec<Tick>> {
        let rows = sqlx::query_as::<_, TickRow>(
            r#"
            SELECT instrument, price_exact, price_value, currency, observed_at, ingested_at
            FROM ticks
            WHERE instrument = ?1 AND observed_at >= ?2
            ORDER BY observed_at ASC, id ASC
            "#,
        )
        .bind(instrument)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tick::try_from).collect()
    }
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct TickRow {
    instrument: String,
    price_exact: String,
    price_value: String,
    currency: String,
    observed_at: i64,
    ingested_at: i64,
}

impl TryFrom<TickRow> for Tick {
    type Error = Error;

    fn try_from(row: TickRow) -> Result<Self> {
        let price_value =
            Decimal::from_str(&row.price_value).map_err(|_| Error::Parse(row.price_value.clone()))?;
        Ok(Tick {
            instrument: row.instrument,
            price_exact: row.price_exact,
            price_value,
            currency: row.currency,
            observed_at: row.observed_at,
            ingested_at: row.ingested_at,
        })
    }
}
