use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{Result, Tick, TickStore};

/// In-process tick series keyed by instrument. Nothing is persisted.
#[derive(Default)]
pub struct MemoryTickStore {
    series: RwLock<HashMap<String, Vec<Tick>>>,
}

impl MemoryTickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored ticks for an instrument.
    pub async fn len(&self, instrument: &str) -> usize {
        self.series
            .read()
            .await
            .get(instrument)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl TickStore for MemoryTickStore {
    async fn insert_tick(&self, tick: &Tick) -> Result<()> {
        self.series
            .write()
            .await
            .entry(tick.instrument.clone())
            .or_default()
            .push(tick.clone());
        Ok(())
    }

    async fn latest_tick(&self, instrument: &str) -> Result<Option<Tick>> {
        let series = self.series.read().await;
        // max_by_key keeps the last maximum, i.e. the latest insert among ties.
        Ok(series
            .get(instrument)
            .and_then(|ticks| ticks.iter().max_by_key(|t| t.observed_at))
            .cloned())
    }

    async fn ticks_since(&self, instrument: &str, since: i64) -> Result<Vec<Tick>> {
        let series = self.series.read().await;
        let mut ticks: Vec<Tick> = series
            .get(instrument)
            .map(|ticks| {
                ticks
                    .iter()
                    .filter(|t| t.observed_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Stable sort keeps insertion order for equal timestamps.
        ticks.sort_by_key(|t| t.observed_at);
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn tick(exact: &str, value: rust_decimal::Decimal, observed_at: i64) -> Tick {
        Tick {
            instrument: "BTC-USD".to_string(),
            price_exact: exact.to_string(),
            price_value: value,
            currency: "USD".to_string(),
            observed_at,
            ingested_at: observed_at,
        }
    }

    #[tokio::test]
    async fn latest_tie_breaks_on_insertion_order() {
        let store = MemoryTickStore::new();
        store.insert_tick(&tick("1", dec!(1), 10)).await.unwrap();
        store.insert_tick(&tick("2", dec!(2), 10)).await.unwrap();

        let latest = store.latest_tick("BTC-USD").await.unwrap().unwrap();
        assert_eq!(latest.price_exact, "2");
    }

    #[tokio::test]
    async fn ticks_since_sorts_by_observed_at() {
        let store = MemoryTickStore::new();
        store.insert_tick(&tick("b", dec!(2), 20)).await.unwrap();
        store.insert_tick(&tick("a", dec!(1), 10)).await.unwrap();
        store.insert_tick(&tick("old", dec!(0), 1)).await.unwrap();

        let ticks = store.ticks_since("BTC-USD", 5).await.unwrap();
        let prices: Vec<&str> = ticks.iter().map(|t| t.price_exact.as_str()).collect();
        assert_eq!(prices, vec!["a", "b"]);
        assert_eq!(store.len("BTC-USD").await, 3);
    }
}
