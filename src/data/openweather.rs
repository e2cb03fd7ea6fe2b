//! OpenWeatherMap integration: geocoding plus current and historical air pollution.
//!
//! Endpoints:
//!
//! - `{geo_url}/direct?q=<city>&limit=1` → `[{name, lat, lon, country, state}]`
//! - `{base_url}/air_pollution?lat&lon` → `{list: [{dt, main: {aqi}, components}]}`
//! - `{base_url}/air_pollution/history?lat&lon&start&end` → same shape
//!
//! Component concentrations come back in µg/m³.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::config::OwmConfig;
use crate::domain::{Components, Location, PollutionSample};
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const INVALID_KEY: &str =
    "Invalid API key. Please ensure your OpenWeatherMap API key is correct and activated.";

/// Anything that can supply pollution observations for a city.
pub trait PollutionSource {
    /// Resolve a city name to coordinates.
    fn locate(&self, city: &str) -> Result<Location, AppError>;

    /// Latest observation at a location.
    fn current(&self, location: &Location) -> Result<PollutionSample, AppError>;

    /// Observations in `[start, end]`, in provider order.
    fn history(
        &self,
        location: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PollutionSample>, AppError>;
}

pub struct OwmClient {
    client: Client,
    config: OwmConfig,
}

impl OwmClient {
    pub fn new(config: OwmConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::new(OwmConfig::from_env()?)
    }

    /// GET `url` and return the body of a successful response.
    fn get_body(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
        not_found: Option<&str>,
    ) -> Result<String, AppError> {
        tracing::debug!(url, ?query, "requesting {what}");

        let resp = self
            .client
            .get(url)
            .query(query)
            .query(&[("appid", self.config.api_key.as_str())])
            .send()
            // `without_url` keeps the key (a query parameter) out of the message.
            .map_err(|e| AppError::runtime(format!("Failed to fetch {what}: {}", e.without_url())))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::rejected(INVALID_KEY));
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(msg) = not_found {
                return Err(AppError::rejected(msg));
            }
        }

        let body = resp
            .text()
            .map_err(|e| AppError::runtime(format!("Failed to read {what} response: {}", e.without_url())))?;

        if !status.is_success() {
            tracing::warn!(%status, "provider returned an error for {what}");
            return Err(AppError::runtime(describe_failure(what, status, &body)));
        }

        Ok(body)
    }
}

impl PollutionSource for OwmClient {
    fn locate(&self, city: &str) -> Result<Location, AppError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::config("City name cannot be empty."));
        }

        let not_found = format!("City '{city}' not found");
        let body = self.get_body(
            &format!("{}/direct", self.config.geo_url),
            &[("q", city.to_string()), ("limit", "1".to_string())],
            "coordinates",
            Some(not_found.as_str()),
        )?;

        let location = parse_location(&body, city)?;
        tracing::info!(city, lat = location.lat, lon = location.lon, "resolved city");
        Ok(location)
    }

    fn current(&self, location: &Location) -> Result<PollutionSample, AppError> {
        let body = self.get_body(
            &format!("{}/air_pollution", self.config.base_url),
            &coords(location),
            "air quality data",
            None,
        )?;

        latest(parse_samples(&body)?)
            .ok_or_else(|| AppError::runtime("Provider returned no air quality data."))
    }

    fn history(
        &self,
        location: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PollutionSample>, AppError> {
        let mut query = coords(location);
        query.push(("start", start.timestamp().to_string()));
        query.push(("end", end.timestamp().to_string()));

        let body = self.get_body(
            &format!("{}/air_pollution/history", self.config.base_url),
            &query,
            "historical data",
            None,
        )?;

        let samples = parse_samples(&body)?;
        tracing::info!(n = samples.len(), %start, %end, "fetched history");
        Ok(samples)
    }
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PollutionResponse {
    #[serde(default)]
    list: Vec<PollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct PollutionEntry {
    dt: i64,
    main: MainIndex,
    #[serde(default)]
    components: Components,
}

#[derive(Debug, Deserialize)]
struct MainIndex {
    aqi: u8,
}

fn coords(location: &Location) -> Vec<(&'static str, String)> {
    vec![
        ("lat", location.lat.to_string()),
        ("lon", location.lon.to_string()),
    ]
}

fn first_location(entries: Vec<GeoEntry>) -> Option<Location> {
    entries.into_iter().next().map(|e| Location {
        name: e.name,
        country: e.country,
        state: e.state,
        lat: e.lat,
        lon: e.lon,
    })
}

fn into_samples(body: PollutionResponse) -> Result<Vec<PollutionSample>, AppError> {
    body.list
        .into_iter()
        .map(|entry| {
            let timestamp = DateTime::from_timestamp(entry.dt, 0).ok_or_else(|| {
                AppError::runtime(format!("Invalid observation timestamp {}.", entry.dt))
            })?;
            Ok(PollutionSample {
                timestamp,
                provider_index: entry.main.aqi,
                components: entry.components,
            })
        })
        .collect()
}

fn latest(samples: Vec<PollutionSample>) -> Option<PollutionSample> {
    samples.into_iter().max_by_key(|s| s.timestamp)
}

fn describe_failure(what: &str, status: StatusCode, body: &str) -> String {
    let mut msg = format!("Failed to fetch {what}: HTTP {status}");
    let body = body.trim();
    if !body.is_empty() {
        msg.push_str(&format!(" - API Response: {body}"));
    }
    msg
}

/// Decode a geocoding response body.
pub fn parse_location(body: &str, city: &str) -> Result<Location, AppError> {
    let entries: Vec<GeoEntry> = serde_json::from_str(body)
        .map_err(|e| AppError::runtime(format!("Failed to parse coordinates response: {e}")))?;
    first_location(entries).ok_or_else(|| AppError::rejected(format!("City '{city}' not found")))
}

/// Decode an air pollution (current or history) response body.
pub fn parse_samples(body: &str) -> Result<Vec<PollutionSample>, AppError> {
    let body: PollutionResponse = serde_json::from_str(body)
        .map_err(|e| AppError::runtime(format!("Failed to parse air quality response: {e}")))?;
    into_samples(body)
}
