use crate::error::{AnalysisError, Result};
use crate::outliers::detect_outliers_by_season;
use crate::profile::season_profile;
use crate::stats::{mean, min_max};
use crate::structs::{AnalysisConfig, CityWeatherData, Dataset, Reading};
use crate::trend::fit_trend;
use rayon::prelude::*;

/// Analyzes one city's slice of the dataset.
///
/// Runs the season profiler, the per-season rolling outlier detector and the
/// trend fit over the city's readings in dataset order, and summarizes the
/// whole slice (outliers included) into mean, min and max temperature.
///
/// # Errors
///
/// Returns `AnalysisError::EmptySelection` if the dataset has no readings for
/// `city`.
pub fn analyze_city(
    dataset: &Dataset,
    city: &str,
    config: &AnalysisConfig,
) -> Result<CityWeatherData> {
    let readings = dataset.for_city(city);
    analyze_readings(city, &readings, config)
}

fn analyze_readings(
    city: &str,
    readings: &[Reading],
    config: &AnalysisConfig,
) -> Result<CityWeatherData> {
    let temps: Vec<f64> = readings.iter().map(|r| r.temperature).collect();
    let (min_temp, max_temp) = min_max(&temps).ok_or_else(|| AnalysisError::EmptySelection {
        city: city.to_string(),
    })?;

    Ok(CityWeatherData {
        city: city.to_string(),
        mean_temp: mean(&temps),
        min_temp,
        max_temp,
        season_profile: season_profile(readings),
        slope: fit_trend(readings),
        outliers: detect_outliers_by_season(readings, config.window),
    })
}

/// Analyzes every city in the dataset in parallel, sorted by city name.
pub fn analyze_all(dataset: &Dataset, config: &AnalysisConfig) -> Result<Vec<CityWeatherData>> {
    dataset
        .cities()
        .into_par_iter()
        .map(|city| analyze_city(dataset, &city, config))
        .collect()
}
