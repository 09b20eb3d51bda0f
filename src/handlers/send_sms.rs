use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::{
    error::AlertError,
    libraries::{compose::compose, recipients},
    models::{SendSmsRequest, SendSmsResponse},
    AppState,
};

/// Relay an SOS message to every configured emergency contact.
///
/// This endpoint:
/// 1. Rejects a missing or blank message (400)
/// 2. Requires provider credentials and a non-empty recipient list (500)
/// 3. Rejects an out-of-range location (400)
/// 4. Appends the address, or the raw coordinates, when a location is given
/// 5. Sends to all recipients in parallel and reports per-recipient results
///
/// Validation and configuration failures return before any provider call.
pub async fn send_sms(
    State(state): State<AppState>,
    payload: Result<Json<SendSmsRequest>, JsonRejection>,
) -> Result<Json<SendSmsResponse>, AlertError> {
    let Json(request) = payload?;

    let dispatch_id = Uuid::new_v4();
    let response = relay_alert(&state, request)
        .instrument(info_span!("sos_dispatch", %dispatch_id))
        .await?;

    Ok(Json(response))
}

async fn relay_alert(
    state: &AppState,
    request: SendSmsRequest,
) -> Result<SendSmsResponse, AlertError> {
    let message = request
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AlertError::Validation("Message is required".to_string()))?;

    let credentials = state.config.provider_credentials().ok_or_else(|| {
        AlertError::Configuration(
            "Twilio not configured. Please set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER"
                .to_string(),
        )
    })?;

    let recipients = state
        .config
        .recipients_raw()
        .map(recipients::parse)
        .filter(|list| !list.is_empty())
        .ok_or_else(|| {
            AlertError::Configuration(
                "Emergency contacts not configured. Please set USER_PHONE_NUMBERS".to_string(),
            )
        })?;

    if let Some(location) = &request.location {
        if !location.is_valid() {
            return Err(AlertError::Validation("Invalid location".to_string()));
        }
    }

    // Best-effort: no address just means the coordinates go out instead
    let address = match &request.location {
        Some(location) => state.geocoder.resolve(location.lat, location.lng).await,
        None => None,
    };
    let body = compose(message, request.location.as_ref(), address.as_deref());

    let outcome = state
        .dispatcher
        .dispatch(&credentials, &body, &recipients)
        .await;

    info!(
        "SOS dispatch complete: {} of {} contact(s) reached",
        outcome.sent_count, outcome.total_recipients
    );

    Ok(SendSmsResponse::from(outcome))
}
