//! Descriptive statistics shared by the outlier detector, the season profiler
//! and the anomaly classifier.

/// Band half-width, in standard deviations.
pub const SIGMA_MULTIPLIER: f64 = 2.0;

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation (N-1 denominator). NaN with fewer than two values.
pub fn sample_std(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return f64::NAN;
    }
    let mean_val = mean(data);
    let variance =
        data.iter().map(|x| (x - mean_val).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Whether `value` lies strictly outside `mean ± SIGMA_MULTIPLIER·std`.
///
/// A NaN mean or std makes both comparisons false, so the value is never
/// reported as outside the band.
pub fn outside_band(value: f64, mean: f64, std: f64) -> bool {
    let std_coeff = SIGMA_MULTIPLIER * std;
    let upper = mean + std_coeff;
    let lower = mean - std_coeff;
    value > upper || value < lower
}

/// Minimum and maximum of a slice, `None` when empty.
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }
    let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sample_std_uses_n_minus_one() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0);
        assert_relative_eq!(sample_std(&data), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn undefined_statistics_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(sample_std(&[]).is_nan());
        assert!(sample_std(&[3.5]).is_nan());
    }

    #[test]
    fn band_is_strict_and_symmetric() {
        assert!(!outside_band(14.0, 10.0, 2.0));
        assert!(!outside_band(6.0, 10.0, 2.0));
        assert!(outside_band(14.01, 10.0, 2.0));
        assert!(outside_band(5.99, 10.0, 2.0));
    }

    #[test]
    fn nan_band_never_flags() {
        assert!(!outside_band(1e9, 0.0, f64::NAN));
        assert!(!outside_band(-1e9, f64::NAN, 1.0));
    }

    #[test]
    fn min_max_of_empty_is_none() {
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[3.0, -1.0, 2.0]), Some((-1.0, 3.0)));
    }
}
