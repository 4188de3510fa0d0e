//! Current-temperature lookup against OpenWeatherMap.
//!
//! Callers depend only on [`WeatherFetcher`]; the two-request protocol
//! (geocoding, then current conditions by coordinates) stays inside
//! [`OpenWeatherMap`].

use crate::error::RemoteServiceError;
use log::debug;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/";

/// Source of the live temperature for a city, in degrees Celsius.
pub trait WeatherFetcher {
    fn current_temperature(&self, city: &str, api_key: &str) -> Result<f64, RemoteServiceError>;
}

/// Configuration for the OpenWeatherMap client
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_url: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoLocation {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainConditions,
}

#[derive(Debug, Deserialize)]
struct MainConditions {
    temp: f64,
}

/// Blocking OpenWeatherMap client.
pub struct OpenWeatherMap {
    client: Client,
    base_url: String,
}

impl OpenWeatherMap {
    pub fn new(config: FetcherConfig) -> Result<Self, RemoteServiceError> {
        let client = Client::builder().build().map_err(transport_error)?;
        let base_url = if config.base_url.ends_with('/') {
            config.base_url
        } else {
            format!("{}/", config.base_url)
        };
        Ok(Self { client, base_url })
    }

    fn geocode(&self, city: &str, api_key: &str) -> Result<GeoLocation, RemoteServiceError> {
        let url = format!("{}geo/1.0/direct", self.base_url);
        let query = format!("{},,", city);
        debug!("Geocoding {}", city);
        let locations: Vec<GeoLocation> = self.get_json(
            &url,
            &[("q", query.as_str()), ("limit", "1"), ("appid", api_key)],
        )?;
        locations
            .into_iter()
            .next()
            .ok_or_else(|| RemoteServiceError::new(404, format!("city not found: {}", city)))
    }

    fn weather_at(
        &self,
        location: &GeoLocation,
        api_key: &str,
    ) -> Result<CurrentWeather, RemoteServiceError> {
        let url = format!("{}data/2.5/weather", self.base_url);
        let lat = location.lat.to_string();
        let lon = location.lon.to_string();
        debug!("Fetching current weather at lat={} lon={}", lat, lon);
        self.get_json(
            &url,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
                ("appid", api_key),
            ],
        )
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RemoteServiceError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(transport_error)?;
        let response = check_status(response)?;
        response.json::<T>().map_err(transport_error)
    }
}

impl WeatherFetcher for OpenWeatherMap {
    fn current_temperature(&self, city: &str, api_key: &str) -> Result<f64, RemoteServiceError> {
        let location = self.geocode(city, api_key)?;
        let weather = self.weather_at(&location, api_key)?;
        debug!("Current temperature in {}: {}", city, weather.main.temp);
        Ok(weather.main.temp)
    }
}

/// Turns a non-2xx response into the service's own `{cod, message}` error,
/// falling back to the HTTP reason phrase when the body is not that shape.
fn check_status(response: Response) -> Result<Response, RemoteServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    debug!("Remote service returned {}: {}", status, body);
    Err(parse_error_body(status.as_u16(), &body))
}

fn parse_error_body(status: u16, body: &str) -> RemoteServiceError {
    match serde_json::from_str::<RemoteServiceError>(body) {
        Ok(err) => RemoteServiceError::new(status, err.message),
        Err(_) => RemoteServiceError::new(
            status,
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("unexpected response")
                .to_string(),
        ),
    }
}

fn transport_error(err: reqwest::Error) -> RemoteServiceError {
    let code = err.status().map(|s| s.as_u16()).unwrap_or(0);
    RemoteServiceError::new(code, err.to_string())
}
