//! OpenWeatherMap client for geocoding and forecasts
//!
//! The forecast is returned as a raw JSON document so that the risk engine
//! can degrade gracefully on unexpected shapes.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::WeatherSettings;
use crate::error::{AppError, AppResult};

/// Resolved coordinates for a free-text address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// One entry of the direct geocoding response
#[derive(Debug, Deserialize)]
struct OWMGeocodeResult {
    name: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl OWMGeocodeResult {
    fn into_location(self) -> Option<GeoLocation> {
        Some(GeoLocation {
            lat: self.lat?,
            lon: self.lon?,
            name: self.name.unwrap_or_else(|| "N/A".to_string()),
            country: self.country.unwrap_or_else(|| "N/A".to_string()),
        })
    }
}

/// OpenWeatherMap API client
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client when an API key is configured
    pub fn from_settings(settings: &WeatherSettings) -> AppResult<Option<Self>> {
        match &settings.api_key {
            Some(key) if !key.trim().is_empty() => Ok(Some(Self::new(
                key.clone(),
                settings.base_url.clone(),
                Duration::from_secs(settings.timeout_secs),
            )?)),
            _ => Ok(None),
        }
    }

    /// Resolve a text address to coordinates using the first match
    pub async fn geocode(&self, address: &str) -> AppResult<GeoLocation> {
        info!(address = %address, "Attempting to geocode address");

        let url = format!("{}/geo/1.0/direct", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| request_error("geocoding", e))?;

        check_status("geocoding", response.status())?;

        let results: Vec<OWMGeocodeResult> = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to parse geocoding response: {}", e)))?;

        let location = results
            .into_iter()
            .next()
            .and_then(OWMGeocodeResult::into_location)
            .ok_or_else(|| {
                warn!(address = %address, "Geocoding returned no usable result");
                AppError::NotFound(format!(
                    "Could not find coordinates for the location: '{}'. Please try a different format (e.g., 'City, Country Code').",
                    address
                ))
            })?;

        info!(
            address = %address,
            name = %location.name,
            country = %location.country,
            lat = location.lat,
            lon = location.lon,
            "Geocoding successful"
        );
        Ok(location)
    }

    /// Fetch the 5-day / 3-hour forecast in metric units
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> AppResult<serde_json::Value> {
        info!(lat = lat, lon = lon, "Fetching weather forecast");

        let url = format!("{}/data/2.5/forecast", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| request_error("forecast", e))?;

        check_status("forecast", response.status())?;

        let document = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to parse forecast response: {}", e)))?;

        info!("Successfully fetched forecast data");
        Ok(document)
    }
}

fn request_error(operation: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        error!(operation = %operation, "Weather service request timed out");
    } else {
        error!(operation = %operation, error = %e, "Weather service request failed");
    }
    AppError::UpstreamError(format!("{} request failed: {}", operation, e))
}

fn check_status(operation: &str, status: StatusCode) -> AppResult<()> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED => {
            error!(operation = %operation, "Weather API rejected the key; check API key validity")
        }
        StatusCode::TOO_MANY_REQUESTS => {
            error!(operation = %operation, "Weather API rate limit exceeded")
        }
        _ => error!(operation = %operation, status = %status, "Weather API error"),
    }

    Err(AppError::UpstreamError(format!(
        "{} returned HTTP {}",
        operation, status
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> WeatherSettings {
        WeatherSettings {
            api_key: api_key.map(str::to_string),
            base_url: "https://api.openweathermap.org/".to_string(),
            timeout_secs: 10,
            default_utc_offset_secs: 0,
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(OpenWeatherClient::from_settings(&settings(None)).unwrap().is_none());
        assert!(OpenWeatherClient::from_settings(&settings(Some("  "))).unwrap().is_none());
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = OpenWeatherClient::from_settings(&settings(Some("key")))
            .unwrap()
            .unwrap();
        assert_eq!(client.base_url, "https://api.openweathermap.org");
    }

    #[test]
    fn test_geocode_result_conversion() {
        let result: Vec<OWMGeocodeResult> = serde_json::from_value(serde_json::json!([
            { "name": "Bhopal", "country": "IN", "lat": 23.2599, "lon": 77.4126 }
        ]))
        .unwrap();
        let location = result.into_iter().next().unwrap().into_location().unwrap();
        assert_eq!(location.name, "Bhopal");
        assert_eq!(location.lat, 23.2599);

        let partial: OWMGeocodeResult =
            serde_json::from_value(serde_json::json!({ "name": "Nowhere", "lat": 1.0 })).unwrap();
        assert!(partial.into_location().is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status("forecast", StatusCode::OK).is_ok());
        assert!(matches!(
            check_status("forecast", StatusCode::TOO_MANY_REQUESTS),
            Err(AppError::UpstreamError(_))
        ));
    }
}
