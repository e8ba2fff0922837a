use std::collections::BTreeMap;

use rust_decimal::Decimal;

use common::{AveragedPoint, Bucket, BucketMode, Candle, Error, Resolution, Result, Tick};

/// Start of the bucket that contains `ts`: `floor(ts / size) * size`.
pub fn bucket_key(ts: i64, size: i64) -> i64 {
    ts.div_euclid(size) * size
}

/// Group a tick series into fixed-width buckets.
///
/// `ticks` must already be cut to the caller's lookback window. Only
/// buckets that hold at least one tick are emitted, always in ascending key
/// order. `Candle` mode has no `Second` granularity.
pub fn resample(ticks: &[Tick], resolution: Resolution, mode: BucketMode) -> Result<Vec<Bucket>> {
    match mode {
        BucketMode::Averaged => Ok(averaged(ticks, resolution)?
            .into_iter()
            .map(Bucket::Point)
            .collect()),
        BucketMode::Candle => Ok(candles(ticks, resolution)?
            .into_iter()
            .map(Bucket::Candle)
            .collect()),
    }
}

/// Averaged points. `Second` is a pass-through that echoes each tick's
/// exact price string. A bucket sum past `Decimal::MAX` is an `Overflow`.
pub fn averaged(ticks: &[Tick], resolution: Resolution) -> Result<Vec<AveragedPoint>> {
    if resolution == Resolution::Second {
        let mut points: Vec<AveragedPoint> = ticks
            .iter()
            .map(|t| AveragedPoint {
                ts: t.observed_at,
                price: t.price_exact.clone(),
            })
            .collect();
        points.sort_by_key(|p| p.ts);
        return Ok(points);
    }

    let size = resolution.size_secs();
    let mut buckets: BTreeMap<i64, (Decimal, usize)> = BTreeMap::new();
    for tick in ticks {
        let acc = buckets
            .entry(bucket_key(tick.observed_at, size))
            .or_insert((Decimal::ZERO, 0));
        acc.0 = acc
            .0
            .checked_add(tick.price_value)
            .ok_or(Error::Overflow("bucket average"))?;
        acc.1 += 1;
    }

    Ok(buckets
        .into_iter()
        .map(|(ts, (sum, count))| AveragedPoint {
            ts,
            price: (sum / Decimal::from(count)).to_string(),
        })
        .collect())
}

/// OHLC candles. Open/close follow the order ticks appear in the input.
pub fn candles(ticks: &[Tick], resolution: Resolution) -> Result<Vec<Candle>> {
    if resolution == Resolution::Second {
        return Err(Error::UnsupportedResolution {
            resolution,
            mode: BucketMode::Candle,
        });
    }

    let size = resolution.size_secs();
    let mut buckets: BTreeMap<i64, Candle> = BTreeMap::new();
    for tick in ticks {
        let key = bucket_key(tick.observed_at, size);
        let price = tick.price_value;
        buckets
            .entry(key)
            .and_modify(|c| {
                c.high = c.high.max(price);
                c.low = c.low.min(price);
                c.close = price;
            })
            .or_insert(Candle {
                ts: key,
                open: price,
                high: price,
                low: price,
                close: price,
            });
    }

    Ok(buckets.into_values().collect())
}
