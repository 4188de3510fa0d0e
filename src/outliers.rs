use crate::stats::{mean, outside_band, sample_std};
use crate::structs::{Reading, Season};
use std::collections::BTreeMap;

/// Bounds `[start, end)` of the centered window of `window` readings around
/// position `i`, clipped to a series of length `len`.
///
/// An even window leans one reading into the past.
fn centered_bounds(i: usize, window: usize, len: usize) -> (usize, usize) {
    let offset = (window - 1) / 2;
    let end = (i + 1 + offset).min(len);
    let start = (i + 1 + offset).saturating_sub(window);
    (start, end)
}

/// Centered moving mean and sample standard deviation of `values`.
///
/// Partial windows are kept at both edges; a position whose window holds a
/// single value gets a NaN std.
pub fn rolling_mean_std(values: &[f64], window: usize) -> Vec<(f64, f64)> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let (start, end) = centered_bounds(i, window, values.len());
            let slice = &values[start..end];
            (mean(slice), sample_std(slice))
        })
        .collect()
}

/// Readings of one ordered series that fall outside the rolling 2-sigma band.
///
/// The series should hold a single (city, season) group.
pub fn detect_outliers(series: &[Reading], window: usize) -> Vec<Reading> {
    let temps: Vec<f64> = series.iter().map(|r| r.temperature).collect();
    rolling_mean_std(&temps, window)
        .into_iter()
        .zip(series)
        .filter(|((m, s), reading)| outside_band(reading.temperature, *m, *s))
        .map(|(_, reading)| reading.clone())
        .collect()
}

/// Applies the rolling band independently to each season of one city's readings
/// and returns the union in input order.
pub fn detect_outliers_by_season(readings: &[Reading], window: usize) -> Vec<Reading> {
    let mut groups: BTreeMap<Season, Vec<usize>> = BTreeMap::new();
    for (idx, reading) in readings.iter().enumerate() {
        groups.entry(reading.season).or_default().push(idx);
    }

    let mut flagged = vec![false; readings.len()];
    for indices in groups.values() {
        let temps: Vec<f64> = indices.iter().map(|&i| readings[i].temperature).collect();
        let bands = rolling_mean_std(&temps, window);
        for (&idx, (m, s)) in indices.iter().zip(bands) {
            flagged[idx] = outside_band(readings[idx].temperature, m, s);
        }
    }

    readings
        .iter()
        .zip(flagged)
        .filter(|(_, is_outlier)| *is_outlier)
        .map(|(reading, _)| reading.clone())
        .collect()
}
