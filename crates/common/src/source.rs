use async_trait::async_trait;

use crate::{RawQuote, Result};

/// Abstraction over the upstream spot-price provider.
///
/// `CoinbaseClient` implements this for the live feed. Tests substitute
/// scripted sources. A failed fetch means "no update this tick" for that
/// instrument; implementations must not retry internally.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for one instrument (e.g. "BTC-USD").
    async fn fetch_quote(&self, instrument: &str) -> Result<RawQuote>;
}
