//! Price-series analytics: resampling, rolling statistics and the buy/sell
//! heuristic. Everything except `query` is pure and synchronous.

pub mod indicators;
pub mod parse;
pub mod query;
pub mod resample;
pub mod rolling;
pub mod signal;
pub mod stats;
pub mod window;

pub use parse::{parse_price, split_instrument};
pub use resample::{averaged, bucket_key, candles, resample};
pub use rolling::{pct_change, rolling_stats};
pub use signal::classify;
pub use window::lookback;
