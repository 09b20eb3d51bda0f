use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    Live,
    Mock,
}

/// Normalized current-weather record handed to the client widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub description: String,
    pub main: String,
    pub icon: String,
    pub clouds: f64,
    pub timestamp: i64, // Unix timestamp
    pub source: WeatherSource,
}

impl WeatherReport {
    /// Canned monsoon conditions served whenever the live lookup is unavailable.
    pub fn mock() -> Self {
        Self {
            temperature: 28.5,
            feels_like: 32.1,
            humidity: 85.0,
            pressure: 1008.0,
            wind_speed: 7.5,
            wind_direction: 180.0,
            description: "moderate rain".to_string(),
            main: "Rain".to_string(),
            icon: "10d".to_string(),
            clouds: 90.0,
            timestamp: Utc::now().timestamp(),
            source: WeatherSource::Mock,
        }
    }
}
