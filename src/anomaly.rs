use crate::error::{AnalysisError, Result};
use crate::fetch::WeatherFetcher;
use crate::stats::outside_band;
use crate::structs::{Season, SeasonProfile};
use serde::Serialize;

/// Whether `temperature` lies outside the 2-sigma band of `season` in `profile`.
///
/// Uses the same band arithmetic as the rolling outlier detector. A season with
/// a NaN std (single historical reading) never classifies as anomalous.
///
/// # Errors
///
/// Returns `AnalysisError::UnknownSeason` if `season` is absent from `profile`.
pub fn is_anomalous(temperature: f64, season: Season, profile: &SeasonProfile) -> Result<bool> {
    let stats = profile
        .get(&season)
        .ok_or(AnalysisError::UnknownSeason(season))?;
    Ok(outside_band(temperature, stats.mean, stats.std))
}

/// Outcome of checking a live reading against the seasonal baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveCheck {
    pub temperature: f64,
    pub anomalous: bool,
}

/// Fetches the current temperature for `city` and classifies it.
///
/// The season is checked against `profile` before any request is made.
/// Remote failures are returned as `AnalysisError::RemoteService` unchanged.
pub fn check_live<F: WeatherFetcher + ?Sized>(
    fetcher: &F,
    city: &str,
    api_key: &str,
    season: Season,
    profile: &SeasonProfile,
) -> Result<LiveCheck> {
    if !profile.contains_key(&season) {
        return Err(AnalysisError::UnknownSeason(season));
    }
    let temperature = fetcher.current_temperature(city, api_key)?;
    let anomalous = is_anomalous(temperature, season, profile)?;
    Ok(LiveCheck {
        temperature,
        anomalous,
    })
}
