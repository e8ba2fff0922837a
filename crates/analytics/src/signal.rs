use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::SignalState;

use crate::indicators::ema;

/// Minimum ordered prices before any classification is attempted.
pub const MIN_HISTORY: usize = 15;
pub const FAST_PERIOD: usize = 5;
pub const SLOW_PERIOD: usize = 15;

/// Classify the latest price of one instrument.
///
/// An EMA(5)/EMA(15) crossover on the final sample wins. Otherwise the last
/// price is compared against `avg_1h` ± 0.2%, but only when `avg_1h` is
/// present and converts to a decimal; a failed conversion just disables
/// that rule. Fewer than `MIN_HISTORY` prices is always `Neutral`.
pub fn classify<A>(prices: &[Decimal], avg_1h: Option<A>) -> SignalState
where
    A: TryInto<Decimal>,
{
    if prices.len() < MIN_HISTORY {
        return SignalState::Neutral;
    }

    if let Some(signal) = crossover(prices) {
        return signal;
    }

    let Some(avg) = avg_1h.and_then(|a| a.try_into().ok()) else {
        return SignalState::Neutral;
    };
    let last = prices[prices.len() - 1];
    // An upper band past Decimal::MAX cannot be exceeded.
    if avg.checked_mul(dec!(1.002)).is_some_and(|upper| last > upper) {
        SignalState::Buy
    } else if last < avg * dec!(0.998) {
        SignalState::Sell
    } else {
        SignalState::Neutral
    }
}

fn crossover(prices: &[Decimal]) -> Option<SignalState> {
    let fast = ema(prices, FAST_PERIOD)?;
    let slow = ema(prices, SLOW_PERIOD)?;
    let n = prices.len();
    if n < 2 {
        return None;
    }

    let (prev_fast, curr_fast) = (fast[n - 2], fast[n - 1]);
    let (prev_slow, curr_slow) = (slow[n - 2], slow[n - 1]);

    if prev_fast <= prev_slow && curr_fast > curr_slow {
        Some(SignalState::Buy)
    } else if prev_fast >= prev_slow && curr_fast < curr_slow {
        Some(SignalState::Sell)
    } else {
        None
    }
}
