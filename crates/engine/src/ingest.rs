use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use analytics::{parse_price, split_instrument};
use common::{now_ts, RawQuote, Result, Tick, TickStore};

/// Validates quotes, drops unchanged prices and appends the rest to the
/// tick series.
///
/// This is the only writer of the store. The read-last/compare/append
/// sequence runs under a per-instrument lock so two concurrent ingests of
/// one instrument can never both pass the dedup check; different
/// instruments never wait on each other.
pub struct Ingestor {
    store: Arc<dyn TickStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Ingestor {
    pub fn new(store: Arc<dyn TickStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Ingest one quote. Returns the stored tick, or `None` when the exact
    /// price string equals the last stored one for the instrument.
    ///
    /// Dedup compares the literal text, so `"100.0"` followed by
    /// `"100.00"` is a change. The currency is always taken from the
    /// instrument's quote half; a mismatching echo is overridden.
    pub async fn ingest(
        &self,
        instrument: &str,
        price_exact: &str,
        currency: &str,
        observed_at: i64,
    ) -> Result<Option<Tick>> {
        let price_value = parse_price(price_exact)?;
        let (base, quote) = split_instrument(instrument)?;
        if !currency.trim().eq_ignore_ascii_case(&quote) {
            debug!(
                instrument,
                echoed = currency,
                derived = %quote,
                "Quote currency mismatch, using instrument's quote currency"
            );
        }
        let instrument = format!("{base}-{quote}");

        let lock = self.lock_for(&instrument).await;
        let _guard = lock.lock().await;

        if let Some(last) = self.store.latest_tick(&instrument).await? {
            if last.price_exact == price_exact {
                debug!(instrument = %instrument, price = price_exact, "Price unchanged, skipping");
                return Ok(None);
            }
        }

        let tick = Tick {
            instrument,
            price_exact: price_exact.to_string(),
            price_value,
            currency: quote,
            observed_at,
            ingested_at: now_ts(),
        };
        self.store.insert_tick(&tick).await?;
        debug!(instrument = %tick.instrument, price = %tick.price_exact, "Tick stored");
        Ok(Some(tick))
    }

    pub async fn ingest_quote(&self, quote: &RawQuote) -> Result<Option<Tick>> {
        self.ingest(
            &quote.instrument,
            &quote.price_exact,
            &quote.quote_currency,
            quote.observed_at,
        )
        .await
    }

    /// Drain the quote channel until every sender is gone. Per-quote
    /// failures are logged and skipped. Call from `tokio::spawn`.
    pub async fn run(self: Arc<Self>, mut quote_rx: mpsc::Receiver<RawQuote>) {
        info!("Ingestor running");
        while let Some(quote) = quote_rx.recv().await {
            if let Err(e) = self.ingest_quote(&quote).await {
                warn!(instrument = %quote.instrument, error = %e, "Dropping quote");
            }
        }
        warn!("Ingestor: quote channel closed");
    }

    async fn lock_for(&self, instrument: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(instrument.to_string())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use common::Error;
    use rust_decimal_macros::dec;
    use store::MemoryTickStore;

    use super::*;

    fn setup() -> (Arc<MemoryTickStore>, Arc<Ingestor>) {
        let store = Arc::new(MemoryTickStore::new());
        let ingestor = Arc::new(Ingestor::new(store.clone()));
        (store, ingestor)
    }

    #[tokio::test]
    async fn same_string_twice_stores_one_tick() {
        let (store, ingestor) = setup();
        let first = ingestor.ingest("BTC-USD", "64000.5", "USD", 1).await.unwrap();
        let second = ingestor.ingest("BTC-USD", "64000.5", "USD", 2).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(store.len("BTC-USD").await, 1);
    }

    #[tokio::test]
    async fn numerically_equal_strings_are_distinct() {
        let (store, ingestor) = setup();
        ingestor.ingest("BTC-USD", "100.0", "USD", 1).await.unwrap();
        let tick = ingestor.ingest("BTC-USD", "100.00", "USD", 2).await.unwrap().unwrap();

        assert_eq!(tick.price_exact, "100.00");
        assert_eq!(tick.price_value, dec!(100));
        assert_eq!(store.len("BTC-USD").await, 2);
    }

    #[tokio::test]
    async fn returning_to_an_earlier_price_is_a_change() {
        let (store, ingestor) = setup();
        for (price, ts) in [("1", 1), ("2", 2), ("1", 3)] {
            assert!(ingestor.ingest("ETH-USD", price, "USD", ts).await.unwrap().is_some());
        }
        assert_eq!(store.len("ETH-USD").await, 3);
    }

    #[tokio::test]
    async fn dedup_is_per_instrument() {
        let (_store, ingestor) = setup();
        assert!(ingestor.ingest("BTC-USD", "5", "USD", 1).await.unwrap().is_some());
        assert!(ingestor.ingest("ETH-USD", "5", "USD", 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn instrument_quote_currency_wins() {
        let (_store, ingestor) = setup();
        let tick = ingestor.ingest("btc-eur", "1", "usd", 1).await.unwrap().unwrap();
        assert_eq!(tick.instrument, "BTC-EUR");
        assert_eq!(tick.currency, "EUR");
    }

    #[tokio::test]
    async fn malformed_price_is_a_parse_error() {
        let (store, ingestor) = setup();
        for bad in ["12,5", "1_000"] {
            let err = ingestor.ingest("BTC-USD", bad, "USD", 1).await.unwrap_err();
            assert!(matches!(err, Error::Parse(_)), "expected parse error for {bad:?}");
        }
        assert_eq!(store.len("BTC-USD").await, 0);
    }

    #[tokio::test]
    async fn instrument_without_separator_is_a_validation_error() {
        let (_store, ingestor) = setup();
        let err = ingestor.ingest("BTCUSD", "1", "USD", 1).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ingests_of_one_price_store_once() {
        let (store, ingestor) = setup();
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let ingestor = ingestor.clone();
                tokio::spawn(async move { ingestor.ingest("SOL-USD", "150.25", "USD", i).await })
            })
            .collect();

        let mut stored = 0;
        for h in handles {
            if h.await.unwrap().unwrap().is_some() {
                stored += 1;
            }
        }
        assert_eq!(stored, 1);
        assert_eq!(store.len("SOL-USD").await, 1);
    }

    #[tokio::test]
    async fn run_skips_bad_quotes_and_keeps_going() {
        let (store, ingestor) = setup();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(ingestor.run(rx));

        let quote = |instrument: &str, price: &str| RawQuote {
            instrument: instrument.to_string(),
            price_exact: price.to_string(),
            base_currency: "X".to_string(),
            quote_currency: "USD".to_string(),
            observed_at: 1,
        };
        tx.send(quote("BTC-USD", "not-a-number")).await.unwrap();
        tx.send(quote("BTCUSD", "1")).await.unwrap();
        tx.send(quote("BTC-USD", "1.5")).await.unwrap();
        drop(tx);

        handle.await.unwrap();
        assert_eq!(store.len("BTC-USD").await, 1);
    }
}
