//! Numeric conversion helpers centralizing rounding and safe numeric casts.

use num_traits::cast::cast;

/// Round to `places` decimal digits, returning 0.0 for non-finite values.
#[must_use]
pub fn round_to_places(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

/// Round to a single decimal digit.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    round_to_places(value, 1)
}

/// Largest one-decimal value that does not exceed `value`.
#[must_use]
pub fn floor_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    // Nudge before flooring so 1.7 stays 1.7 instead of 1.6 through 16.999..
    ((value * 10.0) + 1e-9).floor() / 10.0
}

/// Smallest one-decimal value that is not below `value`.
#[must_use]
pub fn ceil_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    ((value * 10.0) - 1e-9).ceil() / 10.0
}

/// Round half-up and clamp to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let rounded = (value + 0.5).floor().clamp(min, max);
    cast::<f64, i64>(rounded).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Convert a count to f64 for ratio math.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Floor a non-negative f64 into a usize, returning 0 for NaN or negatives.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenth_helpers_stay_on_grid() {
        assert!((round_tenth(3.06) - 3.1).abs() < 1e-12);
        assert!((floor_tenth(3.06) - 3.0).abs() < 1e-12);
        assert!((floor_tenth(1.7) - 1.7).abs() < 1e-12);
        assert!((ceil_tenth(0.8 * 1.3) - 1.1).abs() < 1e-12);
        assert!((ceil_tenth(1.0) - 1.0).abs() < 1e-12);
        assert!((round_to_places(0.1 * 1.333, 2) - 0.13).abs() < 1e-12);
    }

    #[test]
    fn payout_rounding_is_half_up() {
        assert_eq!(round_f64_to_i64(2100.0), 2100);
        assert_eq!(round_f64_to_i64(2.5), 3);
        assert_eq!(round_f64_to_i64(-2.5), -2);
        assert_eq!(round_f64_to_i64(f64::NAN), 0);
    }

    #[test]
    fn floor_to_usize_handles_edges() {
        assert_eq!(floor_f64_to_usize(2.9), 2);
        assert_eq!(floor_f64_to_usize(-1.0), 0);
        assert_eq!(floor_f64_to_usize(f64::NAN), 0);
    }
}
