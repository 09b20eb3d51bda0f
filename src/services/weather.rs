use serde::Deserialize;

use super::error_chain;
use crate::models::{WeatherReport, WeatherSource};

/// OpenWeatherMap current-weather document (only the fields we keep)
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainBlock,
    wind: WindBlock,
    weather: Vec<Condition>,
    clouds: CloudBlock,
    dt: i64,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct CloudBlock {
    all: f64,
}

#[derive(Debug, thiserror::Error)]
enum WeatherError {
    #[error("weather request failed: {0}")]
    Transport(String),

    #[error("weather API returned HTTP {0}")]
    Http(reqwest::StatusCode),

    #[error("failed to parse weather response: {0}")]
    Decode(String),

    #[error("weather response has no conditions")]
    NoConditions,
}

/// Current-weather lookup that degrades to canned conditions instead of failing
#[derive(Debug, Clone)]
pub struct WeatherService {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl WeatherService {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub async fn current(&self, lat: f64, lng: f64) -> WeatherReport {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("No weather API key configured, serving mock conditions");
            return WeatherReport::mock();
        };

        match self.fetch(lat, lng, api_key).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Error fetching current weather: {}", e);
                WeatherReport::mock()
            }
        }
    }

    async fn fetch(&self, lat: f64, lng: f64, api_key: &str) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.api_base);

        let response = self
            .http
            .get(url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Transport(error_chain(&e)))?;

        if !response.status().is_success() {
            return Err(WeatherError::Http(response.status()));
        }

        let data: CurrentWeather = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;

        let condition = data
            .weather
            .into_iter()
            .next()
            .ok_or(WeatherError::NoConditions)?;

        Ok(WeatherReport {
            temperature: data.main.temp,
            feels_like: data.main.feels_like,
            humidity: data.main.humidity,
            pressure: data.main.pressure,
            wind_speed: data.wind.speed,
            wind_direction: data.wind.deg,
            description: condition.description,
            main: condition.main,
            icon: condition.icon,
            clouds: data.clouds.all,
            timestamp: data.dt,
            source: WeatherSource::Live,
        })
    }
}
