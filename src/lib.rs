use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod libraries;
pub mod models;
pub mod services;

use config::Config;
use libraries::dispatcher::AlertDispatcher;
use services::{GeocodeResolver, MessagingProvider, TwilioClient, WeatherService};

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: AlertDispatcher,
    pub geocoder: Arc<GeocodeResolver>,
    pub weather: Arc<WeatherService>,
}

impl AppState {
    /// Wire the production Twilio, Google geocoding and OpenWeatherMap clients
    pub fn from_config(config: Config) -> reqwest::Result<Self> {
        let http = services::http_client()?;
        let messenger = Arc::new(TwilioClient::new(http.clone(), config.twilio_api_base.clone()));
        Ok(Self::with_provider(config, http, messenger))
    }

    /// Same wiring with a caller-supplied messaging provider
    pub fn with_provider(
        config: Config,
        http: reqwest::Client,
        messenger: Arc<dyn MessagingProvider>,
    ) -> Self {
        let geocoder = GeocodeResolver::new(
            http.clone(),
            config.geocode_api_base.clone(),
            config.geocode_api_key().map(str::to_string),
        );
        let weather = WeatherService::new(
            http,
            config.weather_api_base.clone(),
            config.weather_api_key().map(str::to_string),
        );

        Self {
            config: Arc::new(config),
            dispatcher: AlertDispatcher::new(messenger),
            geocoder: Arc::new(geocoder),
            weather: Arc::new(weather),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/health", get(handlers::health))
        .route("/api/send-sms", post(handlers::send_sms))
        .route("/api/weather", get(handlers::current_weather))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
