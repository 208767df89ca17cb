//! Numeric coercion and rounding helpers shared by the rule engines.

/// Map NaN and infinities to `0.0`.
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Round half up (`2.5 → 3`, `-2.5 → -2`).
///
/// Matches the upstream reporting tools, which round ties toward +∞ rather
/// than away from zero.
pub fn round_half_up(v: f64) -> f64 {
    (finite_or_zero(v) + 0.5).floor()
}

/// Round half up to two decimals.
pub fn round2(v: f64) -> f64 {
    round_half_up(v * 100.0) / 100.0
}

/// Round half up and convert to an integer quantity.
pub fn round_to_i64(v: f64) -> i64 {
    round_half_up(v) as i64
}
