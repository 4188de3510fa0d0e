use arrow_schema::ArrowError;
use serde::Deserialize;

use crate::structs::Season;

/// Failure reported by the live weather service, kept verbatim for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{{\"code\": {}, \"message\": {}}}", .code, json_string(.message))]
pub struct RemoteServiceError {
    #[serde(alias = "cod", deserialize_with = "code_from_any")]
    pub code: u16,
    pub message: String,
}

impl RemoteServiceError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

// OpenWeatherMap sends `cod` as a number on some endpoints and a string on others.
fn code_from_any<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Num(u16),
        Text(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Num(n) => Ok(n),
        Code::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No readings found for city: {city}")]
    EmptySelection { city: String },
    #[error("Season {0} is not present in the profile")]
    UnknownSeason(Season),
    #[error("Unrecognized season: {0}")]
    InvalidSeason(String),
    #[error("Remote Service Error: {0}")]
    RemoteService(#[from] RemoteServiceError),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet Error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow Error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("Data Error: {0}")]
    Data(String),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
