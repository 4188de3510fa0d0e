pub mod analyze;
pub mod anomaly;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod load;
pub mod outliers;
pub mod profile;
pub mod stats;
pub mod structs;
pub mod trend;

// Re-export public API
pub use analyze::{analyze_all, analyze_city};
pub use anomaly::{LiveCheck, check_live, is_anomalous};
pub use error::{AnalysisError, RemoteServiceError, Result};
pub use extract::{read_csv, read_dataset, read_parquet};
pub use fetch::{FetcherConfig, OpenWeatherMap, WeatherFetcher};
pub use load::{write_csv, write_json, write_parquet, write_profile_csv};
pub use outliers::{detect_outliers, detect_outliers_by_season};
pub use profile::season_profile;
pub use structs::{
    AnalysisConfig, CitySummary, CityWeatherData, Dataset, Reading, Season, SeasonProfile,
    SeasonStats, SimpleLogger, TrendSlope,
};
pub use trend::fit_trend;
