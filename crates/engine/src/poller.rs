use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use common::{Error, QuoteSource, RawQuote};

/// Fetch stage of the pipeline.
///
/// Every interval, fetches all instruments concurrently. Each fetch is
/// bounded by `timeout` and may fail on its own without affecting its
/// siblings; failures are logged and that instrument simply has no update
/// this tick. Successful quotes go onto the ingest channel in instrument
/// order.
pub struct Poller {
    source: Arc<dyn QuoteSource>,
    instruments: Vec<String>,
    interval: Duration,
    timeout: Duration,
    quote_tx: mpsc::Sender<RawQuote>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        instruments: Vec<String>,
        interval: Duration,
        timeout: Duration,
        quote_tx: mpsc::Sender<RawQuote>,
    ) -> Self {
        Self {
            source,
            instruments,
            interval,
            timeout,
            quote_tx,
        }
    }

    /// Run one polling tick. Returns how many quotes were forwarded, or an
    /// error if the ingest side has gone away.
    pub async fn poll_once(&self) -> Result<usize, mpsc::error::SendError<RawQuote>> {
        let fetches = self.instruments.iter().map(|instrument| async move {
            let result = match time::timeout(self.timeout, self.source.fetch_quote(instrument)).await
            {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout),
            };
            (instrument, result)
        });

        let mut forwarded = 0;
        for (instrument, result) in join_all(fetches).await {
            match result {
                Ok(quote) => {
                    self.quote_tx.send(quote).await?;
                    forwarded += 1;
                }
                Err(e) => {
                    warn!(instrument = %instrument, error = %e, "Quote fetch failed, skipping this tick");
                }
            }
        }
        Ok(forwarded)
    }

    /// Poll forever. Returns only when the ingest channel closes.
    /// Call from `tokio::spawn`.
    pub async fn run(self) {
        info!(
            instruments = ?self.instruments,
            interval = ?self.interval,
            "Poller running"
        );
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.poll_once().await.is_err() {
                warn!("Poller: quote channel closed");
                return;
            }
        }
    }
}
