//! Read-side composition: fetch a window from the store, then hand it to
//! the pure resampler / aggregator / signal functions. Nothing is cached;
//! every call recomputes from the tick series.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use common::{AveragedPoint, BucketMode, Candle, Resolution, Result, TableRow, TickStore};

use crate::resample::{averaged, candles};
use crate::rolling::rolling_stats;
use crate::signal::classify;
use crate::window::{lookback, ONE_DAY, ONE_HOUR};

/// Averaged series for `instrument` over the resolution's lookback window.
pub async fn series<S>(
    store: &S,
    instrument: &str,
    resolution: Resolution,
    now: i64,
) -> Result<Vec<AveragedPoint>>
where
    S: TickStore + ?Sized,
{
    let since = now - lookback(resolution, BucketMode::Averaged)?;
    let ticks = store.ticks_since(instrument, since).await?;
    averaged(&ticks, resolution)
}

/// OHLC candles for `instrument` over the resolution's lookback window.
pub async fn ohlc<S>(
    store: &S,
    instrument: &str,
    resolution: Resolution,
    now: i64,
) -> Result<Vec<Candle>>
where
    S: TickStore + ?Sized,
{
    let since = now - lookback(resolution, BucketMode::Candle)?;
    let ticks = store.ticks_since(instrument, since).await?;
    candles(&ticks, resolution)
}

/// Overview row: last price, 1h stats, signal, 24h change.
pub async fn table_row<S>(store: &S, instrument: &str, now: i64) -> Result<TableRow>
where
    S: TickStore + ?Sized,
{
    let ticks_24h = store.ticks_since(instrument, now - ONE_DAY).await?;
    let hour_start = ticks_24h.partition_point(|t| t.observed_at < now - ONE_HOUR);
    let ticks_1h = &ticks_24h[hour_start..];

    let stats = rolling_stats(ticks_1h, &ticks_24h)?;
    let prices: Vec<Decimal> = ticks_1h.iter().map(|t| t.price_value).collect();
    let signal = classify(&prices, stats.avg_1h);

    debug!(
        instrument,
        ticks_1h = ticks_1h.len(),
        ticks_24h = ticks_24h.len(),
        %signal,
        "Computed table row"
    );

    Ok(TableRow {
        instrument: instrument.to_string(),
        last_price: ticks_1h.last().map(|t| t.price_exact.clone()),
        high_1h: stats.high_1h,
        low_1h: stats.low_1h,
        avg_1h: stats.avg_1h,
        signal,
        volatility_1h: stats.volatility_1h,
        pct_change_24h: stats.pct_change_24h.map(two_places),
    })
}

/// One row per instrument, in the order given.
pub async fn table<S>(store: &S, instruments: &[String], now: i64) -> Result<Vec<TableRow>>
where
    S: TickStore + ?Sized,
{
    let mut rows = Vec::with_capacity(instruments.len());
    for instrument in instruments {
        rows.push(table_row(store, instrument, now).await?);
    }
    Ok(rows)
}

fn two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
