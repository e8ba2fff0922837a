use rust_decimal::Decimal;

/// Exponential Moving Average series, one value per input.
///
/// Smoothing `k = 2 / (period + 1)`, seeded with the first price:
/// `ema[0] = p[0]`, `ema[i] = (p[i] - ema[i-1]) * k + ema[i-1]`.
/// Computed in exact decimal arithmetic. `None` if a step overflows.
pub fn ema(values: &[Decimal], period: usize) -> Option<Vec<Decimal>> {
    let Some(&first) = values.first() else {
        return Some(Vec::new());
    };
    let k = Decimal::TWO / Decimal::from(period + 1);

    let mut out = Vec::with_capacity(values.len());
    let mut prev = first;
    out.push(prev);
    for &price in &values[1..] {
        prev = price.checked_sub(prev)?.checked_mul(k)?.checked_add(prev)?;
        out.push(prev);
    }
    Some(out)
}
