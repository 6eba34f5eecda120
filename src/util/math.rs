//! Numeric helpers shared by the tiling and feature code.

/// Smallest `d` such that `d^3 >= n`, with a floor of 1.
///
/// Used to split a worker count roughly evenly across three axes.
pub(crate) fn cube_root_ceil(n: usize) -> usize {
    let mut d = 1usize;
    while d.saturating_mul(d).saturating_mul(d) < n {
        d += 1;
    }
    d
}

/// Maximum of a sequence; any NaN makes the result NaN.
///
/// Returns NaN for an empty sequence.
pub(crate) fn nan_max<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut max = f64::NAN;
    let mut seen = false;
    for value in values {
        if value.is_nan() {
            return f64::NAN;
        }
        if !seen || value > max {
            max = value;
            seen = true;
        }
    }
    max
}

/// Sample variance with one degree of freedom removed.
///
/// Fewer than two samples yield NaN rather than an error.
pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    sum_sq / (n - 1) as f64
}

/// Rounds half-to-even and checks the result is a valid extent.
pub(crate) fn round_extent(value: f64) -> Option<usize> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round_ties_even();
    if rounded < 0.0 || rounded > usize::MAX as f64 {
        return None;
    }
    Some(rounded as usize)
}

#[cfg(test)]
mod tests {
    use super::{cube_root_ceil, nan_max, round_extent, sample_variance};

    #[test]
    fn cube_root_ceil_matches_small_counts() {
        assert_eq!(cube_root_ceil(0), 1);
        assert_eq!(cube_root_ceil(1), 1);
        assert_eq!(cube_root_ceil(2), 2);
        assert_eq!(cube_root_ceil(8), 2);
        assert_eq!(cube_root_ceil(9), 3);
        assert_eq!(cube_root_ceil(27), 3);
        assert_eq!(cube_root_ceil(28), 4);
    }

    #[test]
    fn nan_max_propagates_nan() {
        assert_eq!(nan_max([1.0, 3.0, 2.0]), 3.0);
        assert!(nan_max([1.0, f64::NAN, 2.0]).is_nan());
        assert!(nan_max(std::iter::empty()).is_nan());
    }

    #[test]
    fn sample_variance_uses_n_minus_one() {
        let var = sample_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert!((var - 5.0 / 3.0).abs() < 1e-12);
        assert!(sample_variance(&[2.0]).is_nan());
        assert!(sample_variance(&[]).is_nan());
    }

    #[test]
    fn round_extent_rounds_half_to_even() {
        assert_eq!(round_extent(2.5), Some(2));
        assert_eq!(round_extent(3.5), Some(4));
        assert_eq!(round_extent(11.7), Some(12));
        assert_eq!(round_extent(-1.0), None);
        assert_eq!(round_extent(f64::NAN), None);
    }
}
