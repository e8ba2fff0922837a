use common::{BucketMode, Error, Resolution, Result};

pub const ONE_MINUTE: i64 = 60;
pub const ONE_HOUR: i64 = 3_600;
pub const ONE_DAY: i64 = 86_400;
pub const THIRTY_DAYS: i64 = 30 * ONE_DAY;

/// How far back a query at `resolution` looks, in seconds.
///
/// | resolution | averaged | candle |
/// |---|---|---|
/// | second | 60s | unsupported |
/// | minute | 1h | 1h |
/// | hour | 24h | 24h |
/// | day | 30d | 30d |
pub fn lookback(resolution: Resolution, mode: BucketMode) -> Result<i64> {
    match (resolution, mode) {
        (Resolution::Second, BucketMode::Averaged) => Ok(ONE_MINUTE),
        (Resolution::Second, BucketMode::Candle) => {
            Err(Error::UnsupportedResolution { resolution, mode })
        }
        (Resolution::Minute, _) => Ok(ONE_HOUR),
        (Resolution::Hour, _) => Ok(ONE_DAY),
        (Resolution::Day, _) => Ok(THIRTY_DAYS),
    }
}
