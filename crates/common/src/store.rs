use async_trait::async_trait;

use crate::{Result, Tick};

/// Storage contract for the tick series.
///
/// `SqliteTickStore` backs the running service; `MemoryTickStore` backs tests.
/// Only the ingestor writes. Readers always get ticks ordered by
/// `observed_at` ascending, ties in insertion order.
#[async_trait]
pub trait TickStore: Send + Sync {
    /// Append one accepted tick.
    async fn insert_tick(&self, tick: &Tick) -> Result<()>;

    /// Most recent tick for an instrument, by `observed_at` then insertion order.
    async fn latest_tick(&self, instrument: &str) -> Result<Option<Tick>>;

    /// All ticks for an instrument with `observed_at >= since`, oldest first.
    async fn ticks_since(&self, instrument: &str, since: i64) -> Result<Vec<Tick>>;
}
