//! Summary statistics over ordered `i64` sequences.
//!
//! Sparse data makes empty sequences a normal occurrence, so every
//! accessor short-circuits to 0 rather than erroring. `median`, `first`
//! and `last` are order-dependent: callers sort before reading.

/// Sums a sequence.
pub fn sum(values: &[i64]) -> i64 {
    values.iter().sum()
}

/// Arithmetic mean, or 0 for the empty sequence.
pub fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) as f64 / values.len() as f64
}

/// Median of a sorted sequence, or 0 for the empty sequence. An even
/// length averages the two middle elements.
pub fn median(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    if values.len() % 2 != 0 {
        return values[values.len() / 2] as f64;
    }
    let i = values.len() / 2;
    (values[i] + values[i - 1]) as f64 / 2.0
}

/// First element, or 0 for the empty sequence.
pub fn first(values: &[i64]) -> i64 {
    values.first().copied().unwrap_or(0)
}

/// Last element, or 0 for the empty sequence.
pub fn last(values: &[i64]) -> i64 {
    values.last().copied().unwrap_or(0)
}

/// Rounds `x` to `prec` decimal places with a half-up tie-break: a
/// fractional part of exactly .5 rounds toward positive infinity for both
/// signs, so 2.5 becomes 3 and -2.5 becomes -2.
pub fn round_float(x: f64, prec: i32) -> f64 {
    let pow = 10f64.powi(prec);
    let intermed = x * pow;
    let frac = intermed.fract();
    let threshold = if frac < 0.0 { -0.5 } else { 0.5 };
    let rounded = if frac >= threshold {
        intermed.ceil()
    } else {
        intermed.floor()
    };
    rounded / pow
}

/// Rounds to the nearest integer with the same half-up tie-break.
pub fn round_int(x: f64) -> i64 {
    round_float(x, 0) as i64
}
