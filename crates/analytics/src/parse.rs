use rust_decimal::Decimal;

use common::{Error, Result};

/// Separator between base and quote currency in an instrument id.
pub const INSTRUMENT_SEPARATOR: char = '-';

/// Parse an upstream price literal into an exact decimal.
///
/// The literal is untrusted: anything that is not a plain decimal
/// (`-?digits(.digits)?`, so no exponents, whitespace, underscores, `+`,
/// or bare points), or that has more digits than fit without rounding, is a
/// `Parse` error.
pub fn parse_price(literal: &str) -> Result<Decimal> {
    if !is_plain_decimal(literal) {
        return Err(Error::Parse(literal.to_string()));
    }
    Decimal::from_str_exact(literal).map_err(|_| Error::Parse(literal.to_string()))
}

fn is_plain_decimal(literal: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let unsigned = literal.strip_prefix('-').unwrap_or(literal);
    match unsigned.split_once('.') {
        Some((int, frac)) => digits(int) && digits(frac),
        None => digits(unsigned),
    }
}

/// Split `BASE-QUOTE` into uppercased halves.
pub fn split_instrument(instrument: &str) -> Result<(String, String)> {
    let (base, quote) = instrument
        .split_once(INSTRUMENT_SEPARATOR)
        .ok_or_else(|| Error::Validation(format!("instrument must be like BTC-USD, got '{instrument}'")))?;

    let (base, quote) = (base.trim(), quote.trim());
    if base.is_empty() || quote.is_empty() {
        return Err(Error::Validation(format!(
            "instrument must be like BTC-USD, got '{instrument}'"
        )));
    }
    Ok((base.to_uppercase(), quote.to_uppercase()))
}
