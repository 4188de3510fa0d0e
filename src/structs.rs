use chrono::NaiveDateTime;
use log::{Log, Metadata, Record as LogRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Default rolling window, in readings, for outlier detection.
pub const DEFAULT_WINDOW: usize = 30;

/// Simple logger implementation, filtered by `log::max_level()`
pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Meteorological season, the closed set a reading can be tagged with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Autumn,
    Spring,
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Autumn,
        Season::Spring,
        Season::Summer,
        Season::Winter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Autumn => "autumn",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "autumn" => Ok(Season::Autumn),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            _ => Err(AnalysisError::InvalidSeason(s.to_string())),
        }
    }
}

/// One historical temperature observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub season: Season,
    pub temperature: f64,
}

/// Readings in their input order; cities and seasons may be interleaved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub readings: Vec<Reading>,
}

impl Dataset {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct city names, sorted.
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self.readings.iter().map(|r| r.city.clone()).collect();
        cities.sort();
        cities.dedup();
        cities
    }

    /// The city's readings, in dataset order.
    pub fn for_city(&self, city: &str) -> Vec<Reading> {
        self.readings
            .iter()
            .filter(|r| r.city == city)
            .cloned()
            .collect()
    }
}

/// Mean and sample standard deviation of one season's temperatures.
///
/// `std` is NaN when the season has a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub mean: f64,
    pub std: f64,
}

pub type SeasonProfile = BTreeMap<Season, SeasonStats>;

/// Regression weights for the time ordinal and the lag-1 temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSlope {
    pub time: f64,
    pub lag: f64,
}

impl TrendSlope {
    pub fn as_array(&self) -> [f64; 2] {
        [self.time, self.lag]
    }

    /// Both coefficients positive after rounding to display precision.
    pub fn is_positive(&self) -> bool {
        self.as_array().iter().all(|&c| round2(c) > 0.0)
    }
}

/// Consolidated analysis of one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeatherData {
    pub city: String,
    pub mean_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub season_profile: SeasonProfile,
    pub slope: TrendSlope,
    pub outliers: Vec<Reading>,
}

/// Display row of a `CityWeatherData`, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySummary {
    pub city: String,
    pub mean_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub slope: [f64; 2],
    pub trend_positive: bool,
    pub outlier_count: usize,
}

impl CityWeatherData {
    pub fn summary(&self) -> CitySummary {
        CitySummary {
            city: self.city.clone(),
            mean_temp: round2(self.mean_temp),
            min_temp: round2(self.min_temp),
            max_temp: round2(self.max_temp),
            slope: self.slope.as_array().map(round2),
            trend_positive: self.slope.is_positive(),
            outlier_count: self.outliers.len(),
        }
    }
}

/// Configuration for city analysis
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
