use std::time::Duration;

use crate::{Error, Result};

const DEFAULT_CRYPTOS: &str = "BTC-USD,ETH-USD,SOL-USD,DOGE-USD";
const DEFAULT_COINBASE_BASE_URL: &str = "https://api.coinbase.com/v2/prices";
const DEFAULT_DATABASE_URL: &str = "sqlite://crypto_prices.sqlite";

/// All configuration loaded from environment variables at startup.
/// Immutable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    // Quote source
    pub instruments: Vec<String>,
    pub fetch_interval: Duration,
    pub fetch_timeout: Duration,
    pub coinbase_base_url: String,

    // Database
    pub database_url: String,

    // Read API
    pub http_port: u16,
    pub app_user: String,
    pub app_pass: String,

    // OHLC snapshots
    pub snapshot_dir: Option<String>,
    pub snapshot_interval: Duration,
}

impl Config {
    /// Load from the process environment. Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_cryptos = lookup("CRYPTOS").unwrap_or_else(|| DEFAULT_CRYPTOS.to_string());
        let instruments = parse_instruments(&raw_cryptos)?;

        Ok(Config {
            instruments,
            fetch_interval: secs(&lookup, "FETCH_INTERVAL_SECONDS", 1.0)?,
            fetch_timeout: secs(&lookup, "FETCH_TIMEOUT_SECONDS", 10.0)?,
            coinbase_base_url: lookup("COINBASE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COINBASE_BASE_URL.to_string()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            http_port: match lookup("HTTP_PORT") {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("HTTP_PORT is not a port: '{v}'")))?,
                None => 8000,
            },
            app_user: lookup("APP_USER").unwrap_or_else(|| "admin".to_string()),
            app_pass: lookup("APP_PASS").ok_or_else(|| {
                Error::Config(
                    "Required environment variable 'APP_PASS' is not set. Check your .env file."
                        .to_string(),
                )
            })?,
            snapshot_dir: lookup("SNAPSHOT_DIR").filter(|v| !v.trim().is_empty()),
            snapshot_interval: secs(&lookup, "SNAPSHOT_INTERVAL_SECONDS", 10.0)?,
        })
    }
}

/// Split a comma-separated instrument list. Entries are trimmed and
/// uppercased; empties are dropped. Each entry must look like `BASE-QUOTE`.
fn parse_instruments(raw: &str) -> Result<Vec<String>> {
    let instruments: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if instruments.is_empty() {
        return Err(Error::Config("CRYPTOS lists no instruments".to_string()));
    }
    if let Some(bad) = instruments.iter().find(|s| !is_pair(s)) {
        return Err(Error::Config(format!(
            "CRYPTOS entry '{bad}' must look like BTC-USD"
        )));
    }
    Ok(instruments)
}

/// `BASE-QUOTE` with both halves non-empty.
fn is_pair(instrument: &str) -> bool {
    instrument
        .split_once('-')
        .is_some_and(|(base, quote)| !base.trim().is_empty() && !quote.trim().is_empty())
}

fn secs<F>(lookup: &F, key: &str, default: f64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Config(format!("{key} is not a number: '{v}'")))?,
        None => default,
    };
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Config(format!("{key} must be > 0, got {value}")));
    }
    Ok(Duration::from_secs_f64(value))
}
