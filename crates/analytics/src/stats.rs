//! Decimal statistics over in-memory samples.
//!
//! Everything here is storage-agnostic: callers fetch the window first and
//! pass the prices in. Arithmetic is checked; prices are untrusted and may
//! sit anywhere in `Decimal`'s range.

use rust_decimal::{Decimal, MathematicalOps};

use common::{Error, Result};

pub fn mean(values: &[Decimal]) -> Result<Option<Decimal>> {
    if values.is_empty() {
        return Ok(None);
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, &v| acc.checked_add(v))
        .ok_or(Error::Overflow("mean"))?;
    Ok(Some(sum / Decimal::from(values.len())))
}

/// Population standard deviation. A single sample yields zero.
///
/// Deviations are scaled by the largest one before squaring, so the squares
/// stay within `[0, 1]` and only the deviations themselves can overflow.
pub fn population_stddev(values: &[Decimal]) -> Result<Option<Decimal>> {
    let Some(mean) = mean(values)? else {
        return Ok(None);
    };
    let diffs = values
        .iter()
        .map(|&v| v.checked_sub(mean))
        .collect::<Option<Vec<Decimal>>>()
        .ok_or(Error::Overflow("stddev"))?;

    let scale = diffs.iter().map(|d| d.abs()).max().unwrap_or(Decimal::ZERO);
    if scale.is_zero() {
        return Ok(Some(Decimal::ZERO));
    }

    let sum_sq: Decimal = diffs
        .iter()
        .map(|d| {
            let unit = *d / scale;
            unit * unit
        })
        .sum();
    let root = (sum_sq / Decimal::from(values.len()))
        .sqrt()
        .ok_or(Error::Overflow("stddev"))?;
    Ok(Some(root * scale))
}
