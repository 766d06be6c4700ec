//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64, saturating on the (theoretical) overflow path.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(f64::MAX)
}

/// Ratio of `part` over `whole`, returning 0.0 when `whole` is zero.
#[must_use]
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    count_to_f64(part) / count_to_f64(whole)
}

/// Round a percentage to the nearest integer and clamp it into `0..=100`.
#[must_use]
pub fn round_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    let clamped = value.clamp(0.0, 100.0).round();
    cast::<f64, u8>(clamped).unwrap_or(0)
}

/// Percentage of `part` over `whole`, rounded to nearest.
#[must_use]
pub fn percent(part: usize, whole: usize) -> u8 {
    round_percent(ratio(part, whole) * 100.0)
}

/// Milliseconds to whole seconds, rounding any remainder up.
#[must_use]
pub const fn ceil_secs(millis: u128) -> u64 {
    let secs = millis.div_ceil(1_000);
    if secs > u64::MAX as u128 {
        u64::MAX
    } else {
        secs as u64
    }
}
