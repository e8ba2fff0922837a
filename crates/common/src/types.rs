use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A quote as delivered by the quote source, before validation.
/// `price_exact` is the upstream decimal literal, untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuote {
    pub instrument: String,
    pub price_exact: String,
    pub base_currency: String,
    pub quote_currency: String,
    /// Seconds since epoch as reported by the source.
    pub observed_at: i64,
}

/// One accepted, deduplicated price observation.
///
/// `price_exact` is the source of truth for equality and dedup. `price_value`
/// is parsed from it once and only ever used for arithmetic; the string is
/// never rebuilt from the number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: String,
    pub price_exact: String,
    pub price_value: Decimal,
    pub currency: String,
    pub observed_at: i64,
    pub ingested_at: i64,
}

/// Bucket width selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Second,
    Minute,
    Hour,
    Day,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Resolution::Second,
        Resolution::Minute,
        Resolution::Hour,
        Resolution::Day,
    ];

    /// Bucket width in seconds.
    pub fn size_secs(self) -> i64 {
        match self {
            Resolution::Second => 1,
            Resolution::Minute => 60,
            Resolution::Hour => 3_600,
            Resolution::Day => 86_400,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Second => "second",
            Resolution::Minute => "minute",
            Resolution::Hour => "hour",
            Resolution::Day => "day",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    /// Case-insensitive. Anything outside `second|minute|hour|day` is an
    /// invalid argument.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "second" => Ok(Resolution::Second),
            "minute" => Ok(Resolution::Minute),
            "hour" => Ok(Resolution::Hour),
            "day" => Ok(Resolution::Day),
            other => Err(Error::InvalidArgument(format!(
                "resolution must be one of: second, minute, hour, day (got '{other}')"
            ))),
        }
    }
}

/// Output shape requested from the resampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMode {
    Averaged,
    Candle,
}

impl std::fmt::Display for BucketMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketMode::Averaged => write!(f, "averaged"),
            BucketMode::Candle => write!(f, "candle"),
        }
    }
}

/// Averaged bucket. `price` is a decimal string so no precision is lost on
/// the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AveragedPoint {
    pub ts: i64,
    pub price: String,
}

/// OHLC candle over `[ts, ts + size)`. Open and close follow tick arrival
/// order inside the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub ts: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bucket {
    Point(AveragedPoint),
    Candle(Candle),
}

impl Bucket {
    pub fn ts(&self) -> i64 {
        match self {
            Bucket::Point(p) => p.ts,
            Bucket::Candle(c) => c.ts,
        }
    }
}

/// Trailing-window statistics. Every field is `None` when its window does
/// not hold enough samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingStats {
    pub high_1h: Option<Decimal>,
    pub low_1h: Option<Decimal>,
    pub avg_1h: Option<Decimal>,
    pub volatility_1h: Option<Decimal>,
    pub pct_change_24h: Option<Decimal>,
}

/// Buy/sell heuristic for the latest tick of one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalState {
    #[serde(rename = "B")]
    Buy,
    #[serde(rename = "S")]
    Sell,
    #[default]
    #[serde(rename = "-")]
    Neutral,
}

impl std::fmt::Display for SignalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalState::Buy => write!(f, "B"),
            SignalState::Sell => write!(f, "S"),
            SignalState::Neutral => write!(f, "-"),
        }
    }
}

/// One row of the instrument overview table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub instrument: String,
    pub last_price: Option<String>,
    pub high_1h: Option<Decimal>,
    pub low_1h: Option<Decimal>,
    pub avg_1h: Option<Decimal>,
    pub signal: SignalState,
    pub volatility_1h: Option<Decimal>,
    pub pct_change_24h: Option<Decimal>,
}
