use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{Error, Result, RollingStats, Tick};

use crate::stats::{mean, population_stddev};

/// Trailing-window statistics.
///
/// `ticks_1h` and `ticks_24h` are already cut to the trailing 3600s and
/// 86400s windows, oldest first. High/low/avg/volatility are `None` together
/// when the 1h window is empty; the percent change needs two 24h samples.
pub fn rolling_stats(ticks_1h: &[Tick], ticks_24h: &[Tick]) -> Result<RollingStats> {
    let prices_1h: Vec<Decimal> = ticks_1h.iter().map(|t| t.price_value).collect();
    let prices_24h: Vec<Decimal> = ticks_24h.iter().map(|t| t.price_value).collect();

    Ok(RollingStats {
        high_1h: prices_1h.iter().max().copied(),
        low_1h: prices_1h.iter().min().copied(),
        avg_1h: mean(&prices_1h)?,
        volatility_1h: population_stddev(&prices_1h)?,
        pct_change_24h: pct_change(&prices_24h)?,
    })
}

/// `(last - first) / first * 100` over a chronologically ordered series.
/// A zero base is reported, not hidden.
pub fn pct_change(prices: &[Decimal]) -> Result<Option<Decimal>> {
    if prices.len() < 2 {
        return Ok(None);
    }
    let (first, last) = (prices[0], prices[prices.len() - 1]);
    if first.is_zero() {
        return Err(Error::DivisionByZero);
    }
    last.checked_sub(first)
        .and_then(|delta| delta.checked_div(first))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .map(Some)
        .ok_or(Error::Overflow("percent change"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(prices: &[Decimal]) -> Vec<Tick> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Tick {
                instrument: "ETH-USD".to_string(),
                price_exact: p.to_string(),
                price_value: p,
                currency: "USD".to_string(),
                observed_at: i as i64,
                ingested_at: i as i64,
            })
            .collect()
    }

    #[test]
    fn empty_1h_window_yields_no_stats() {
        let stats = rolling_stats(&[], &[]).unwrap();
        assert_eq!(stats, RollingStats::default());
    }

    #[test]
    fn single_sample_has_zero_volatility_and_no_change() {
        let one = ticks(&[dec!(50)]);
        let stats = rolling_stats(&one, &one).unwrap();
        assert_eq!(stats.high_1h, Some(dec!(50)));
        assert_eq!(stats.low_1h, Some(dec!(50)));
        assert_eq!(stats.avg_1h, Some(dec!(50)));
        assert_eq!(stats.volatility_1h, Some(Decimal::ZERO));
        assert_eq!(stats.pct_change_24h, None);
    }

    #[test]
    fn high_low_avg_over_1h_window() {
        let hour = ticks(&[dec!(10), dec!(30), dec!(20)]);
        let stats = rolling_stats(&hour, &hour).unwrap();
        assert_eq!(stats.high_1h, Some(dec!(30)));
        assert_eq!(stats.low_1h, Some(dec!(10)));
        assert_eq!(stats.avg_1h, Some(dec!(20)));
    }

    #[test]
    fn pct_change_of_100_to_110_is_ten_percent() {
        let day = ticks(&[dec!(100), dec!(105), dec!(110)]);
        let stats = rolling_stats(&[], &day).unwrap();
        assert_eq!(stats.pct_change_24h, Some(dec!(10)));
        assert_eq!(pct_change(&[dec!(100), dec!(110)]).unwrap(), Some(dec!(10)));
    }

    #[test]
    fn pct_change_with_zero_base_is_an_error() {
        assert!(matches!(
            pct_change(&[dec!(0), dec!(5)]),
            Err(Error::DivisionByZero)
        ));
        let day = ticks(&[dec!(0), dec!(5)]);
        assert!(matches!(rolling_stats(&[], &day), Err(Error::DivisionByZero)));
    }

    #[test]
    fn wide_1h_spread_still_yields_stats() {
        let hour = ticks(&[dec!(1), dec!(1000000000000000)]);
        let stats = rolling_stats(&hour, &hour).unwrap();
        assert_eq!(stats.avg_1h, Some(dec!(500000000000000.5)));
        assert!(stats.volatility_1h.is_some());
    }

    #[test]
    fn huge_prices_report_overflow_instead_of_panicking() {
        let hour = ticks(&[Decimal::MAX, Decimal::MAX]);
        assert!(matches!(
            rolling_stats(&hour, &hour),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            pct_change(&[dec!(0.0000000000000000000000000001), Decimal::MAX]),
            Err(Error::Overflow(_))
        ));
    }

    #[test]
    fn pct_change_needs_two_samples() {
        assert_eq!(pct_change(&[]).unwrap(), None);
        assert_eq!(pct_change(&[dec!(0)]).unwrap(), None);
    }
}
