#![allow(dead_code)]

use alert_service::{
    config::{Config, ProviderCredentials},
    services::{MessagingProvider, ProviderError, ProviderReceipt},
};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory provider that records every send and rejects numbers ending in 0
#[derive(Default)]
pub struct RecordingProvider {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingProvider {
    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl MessagingProvider for RecordingProvider {
    async fn send(
        &self,
        _credentials: &ProviderCredentials,
        to: &str,
        body: &str,
    ) -> Result<ProviderReceipt, ProviderError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));

        if to.ends_with('0') {
            return Err(ProviderError::Rejected(format!(
                "The 'To' number {} is not a valid phone number.",
                to
            )));
        }
        Ok(ProviderReceipt {
            message_id: format!("SM{}", to.trim_start_matches('+')),
        })
    }
}

pub fn configured(recipients: &str) -> Config {
    Config {
        twilio_account_sid: Some("AC123".to_string()),
        twilio_auth_token: Some("secret".to_string()),
        twilio_phone_number: Some("+15005550006".to_string()),
        user_phone_numbers: Some(recipients.to_string()),
        // Nothing listens here; any unexpected upstream call fails fast
        geocode_api_base: "http://127.0.0.1:9".to_string(),
        weather_api_base: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    }
}

/// Serve a canned Google geocoding answer on a throwaway port
pub async fn spawn_fake_geocoder(address: &'static str) -> String {
    use axum::{routing::get, Json, Router};

    let app = Router::new().route(
        "/maps/api/geocode/json",
        get(move || async move {
            Json(serde_json::json!({
                "status": "OK",
                "results": [{ "formatted_address": address }]
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
