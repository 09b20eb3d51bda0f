use serde::{Deserialize, Serialize};

use super::dispatch::{AggregateOutcome, DispatchResult};
use super::location::LocationFix;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendSmsRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub location: Option<LocationFix>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsResponse {
    pub success: bool,
    pub total_contacts: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<DispatchResult>,
    pub message: String,
}

impl From<AggregateOutcome> for SendSmsResponse {
    fn from(outcome: AggregateOutcome) -> Self {
        Self {
            success: outcome.overall_success,
            total_contacts: outcome.total_recipients,
            sent: outcome.sent_count,
            failed: outcome.failed_count,
            message: format!(
                "SMS sent to {} of {} contact(s)",
                outcome.sent_count, outcome.total_recipients
            ),
            results: outcome.per_recipient_results,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lng: f64,
}
