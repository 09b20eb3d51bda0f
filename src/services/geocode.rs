use serde::Deserialize;

use super::error_chain;

/// Google Geocoding API response structure
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

#[derive(Debug, thiserror::Error)]
enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(String),

    #[error("geocoding API returned HTTP {0}")]
    Http(reqwest::StatusCode),

    #[error("failed to parse geocoding response: {0}")]
    Decode(String),
}

/// Best-effort reverse geocoder. Never fails the caller.
#[derive(Debug, Clone)]
pub struct GeocodeResolver {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl GeocodeResolver {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Resolve coordinates to a formatted street address.
    ///
    /// Returns `None` when no API key is configured, when the provider has no
    /// match, or on any transport or decode failure. Exactly one upstream call,
    /// no retry: an SOS must not stall on a slow geocoder.
    pub async fn resolve(&self, lat: f64, lng: f64) -> Option<String> {
        let api_key = self.api_key.as_deref()?;

        match self.lookup(lat, lng, api_key).await {
            Ok(Some(address)) => {
                tracing::debug!("Resolved ({}, {}) to {}", lat, lng, address);
                Some(address)
            }
            Ok(None) => {
                tracing::debug!("No address found for ({}, {})", lat, lng);
                None
            }
            Err(e) => {
                tracing::warn!("Geocoding error: {}", e);
                None
            }
        }
    }

    async fn lookup(
        &self,
        lat: f64,
        lng: f64,
        api_key: &str,
    ) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/maps/api/geocode/json", self.api_base);
        let latlng = format!("{},{}", lat, lng);

        let response = self
            .http
            .get(url)
            .query(&[("latlng", latlng.as_str()), ("key", api_key)])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(error_chain(&e)))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Http(response.status()));
        }

        let data: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        if data.status != "OK" {
            tracing::debug!("Geocoding API status {}", data.status);
            return Ok(None);
        }

        Ok(data.results.into_iter().next().map(|r| r.formatted_address))
    }
}
