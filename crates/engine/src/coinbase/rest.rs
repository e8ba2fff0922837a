use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{now_ts, Error, QuoteSource, RawQuote, Result};

/// REST client for Coinbase public spot prices. No credentials needed.
pub struct CoinbaseClient {
    base_url: String,
    http: Client,
}

impl CoinbaseClient {
    /// `timeout` bounds each request end to end; a timed-out fetch is just a
    /// failed fetch for that instrument.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn spot_url(&self, instrument: &str) -> String {
        format!("{}/{instrument}/spot", self.base_url)
    }
}

#[async_trait]
impl QuoteSource for CoinbaseClient {
    async fn fetch_quote(&self, instrument: &str) -> Result<RawQuote> {
        let url = self.spot_url(instrument);
        debug!(instrument, %url, "Fetching spot price");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Source(format!("HTTP {status}: {body}")));
        }

        parse_spot_response(instrument, &body, now_ts())
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SpotResponse {
    data: SpotData,
}

/// `amount` stays a string: the exact literal is what gets stored.
#[derive(Deserialize)]
struct SpotData {
    amount: String,
    base: String,
    currency: String,
}

fn parse_spot_response(instrument: &str, body: &str, observed_at: i64) -> Result<RawQuote> {
    let spot: SpotResponse =
        serde_json::from_str(body).map_err(|e| Error::Source(e.to_string()))?;
    Ok(RawQuote {
        instrument: instrument.to_string(),
        price_exact: spot.data.amount,
        base_currency: spot.data.base,
        quote_currency: spot.data.currency,
        observed_at,
    })
}
