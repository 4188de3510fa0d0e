//! Linear trend of temperature against calendar day and the previous reading.
//!
//! The model is `temperature ≈ b0 + b1·ordinal + b2·lag`, fitted by ordinary
//! least squares. Only `(b1, b2)` are reported.
//!
//! The regressors are centered before forming the normal equations. That leaves
//! the slope coefficients unchanged but keeps the day ordinals (around 7·10⁵)
//! from swamping the 2×2 system. When the centered system is rank deficient the
//! minimum-norm least-squares solution is returned instead, which is zero when
//! neither regressor varies.

use crate::structs::{Reading, TrendSlope};
use chrono::{Datelike, NaiveDateTime};

/// Relative determinant below which the normal matrix is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Proleptic Gregorian day number, with 0001-01-01 as day 1.
pub fn day_ordinal(timestamp: &NaiveDateTime) -> i64 {
    i64::from(timestamp.date().num_days_from_ce())
}

/// Temperature of the preceding reading in the given order; 0 for the first.
pub fn lag_one(temps: &[f64]) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(temps.iter().copied())
        .take(temps.len())
        .collect()
}

/// Fits the trend model over readings in their given order.
pub fn fit_trend(readings: &[Reading]) -> TrendSlope {
    let ordinals: Vec<f64> = readings
        .iter()
        .map(|r| day_ordinal(&r.timestamp) as f64)
        .collect();
    let temps: Vec<f64> = readings.iter().map(|r| r.temperature).collect();
    let lags = lag_one(&temps);

    let (time, lag) = ols_two_regressors(&ordinals, &lags, &temps);
    TrendSlope { time, lag }
}

/// Slope coefficients of `y = b0 + b1·x1 + b2·x2`.
fn ols_two_regressors(x1: &[f64], x2: &[f64], y: &[f64]) -> (f64, f64) {
    let n = y.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let nf = n as f64;
    let m1 = x1.iter().sum::<f64>() / nf;
    let m2 = x2.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;

    // Centered cross-products: X'X = [[s11, s12], [s12, s22]], X'y = [s1y, s2y]
    let (mut s11, mut s12, mut s22, mut s1y, mut s2y) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for i in 0..n {
        let a = x1[i] - m1;
        let b = x2[i] - m2;
        let c = y[i] - my;
        s11 += a * a;
        s12 += a * b;
        s22 += b * b;
        s1y += a * c;
        s2y += b * c;
    }

    let det = s11 * s22 - s12 * s12;
    let scale = s11 * s22;
    if det.is_finite() && scale > 0.0 && det > SINGULAR_TOLERANCE * scale {
        let b1 = (s22 * s1y - s12 * s2y) / det;
        let b2 = (s11 * s2y - s12 * s1y) / det;
        return (b1, b2);
    }

    // Rank <= 1: the pseudo-inverse of a rank-1 symmetric S is S / trace(S)².
    let trace = s11 + s22;
    if !trace.is_finite() || trace <= 0.0 {
        return (0.0, 0.0);
    }
    let t2 = trace * trace;
    let b1 = (s11 * s1y + s12 * s2y) / t2;
    let b2 = (s12 * s1y + s22 * s2y) / t2;
    (b1, b2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::Season;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};

    fn readings(temps: impl IntoIterator<Item = f64>) -> Vec<Reading> {
        let base = NaiveDate::from_ymd_opt(2010, 1, 1)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        temps
            .into_iter()
            .enumerate()
            .map(|(i, t)| Reading {
                city: "Cairo".to_string(),
                timestamp: base + Duration::days(i as i64),
                season: Season::Winter,
                temperature: t,
            })
            .collect()
    }

    #[test]
    fn ordinal_matches_proleptic_day_count() {
        let first = NaiveDate::from_ymd_opt(1, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(day_ordinal(&first), 1);

        let evening = NaiveDate::from_ymd_opt(2010, 1, 1)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(day_ordinal(&evening), 733_773);
    }

    #[test]
    fn lag_starts_at_zero() {
        assert_eq!(lag_one(&[5.0, 7.0, 9.0]), vec![0.0, 5.0, 7.0]);
        assert!(lag_one(&[]).is_empty());
    }

    #[test]
    fn recovers_linear_warming() {
        let slope = fit_trend(&readings((0..200).map(|t| 3.0 + 0.05 * t as f64)));
        assert_abs_diff_eq!(slope.time, 0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(slope.lag, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn recovers_pure_persistence() {
        // y_t = 2 + 0.5·y_{t-1}, with the first point matching the zero lag.
        let mut temps = vec![2.0];
        for _ in 1..30 {
            let prev = *temps.last().unwrap();
            temps.push(2.0 + 0.5 * prev);
        }
        let slope = fit_trend(&readings(temps));
        assert_abs_diff_eq!(slope.lag, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(slope.time, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_inputs_fall_back_without_panicking() {
        assert_eq!(fit_trend(&[]), TrendSlope { time: 0.0, lag: 0.0 });

        let single = fit_trend(&readings([12.0]));
        assert_eq!(single, TrendSlope { time: 0.0, lag: 0.0 });

        // All readings on one day: the ordinal column is constant.
        let mut same_day = readings([1.0, 2.0, 3.0, 4.0]);
        let day = same_day[0].timestamp;
        for r in &mut same_day {
            r.timestamp = day;
        }
        let slope = fit_trend(&same_day);
        assert_eq!(slope.time, 0.0);
        assert_abs_diff_eq!(slope.lag, 1.0, epsilon = 1e-12);
    }
}
