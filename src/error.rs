use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorResponse;

/// Request-fatal failures of the SOS endpoint.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AlertError {
    /// Malformed or missing request input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Body was not the JSON document we expect.
    #[error("Invalid request body")]
    InvalidBody { details: String },

    /// Deployment is missing credentials or recipients. Operator-actionable.
    #[error("{0}")]
    Configuration(String),
}

impl AlertError {
    pub fn status(&self) -> StatusCode {
        match self {
            AlertError::Validation(_) | AlertError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            AlertError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        let details = match &self {
            AlertError::InvalidBody { details } => Some(details.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for AlertError {
    fn from(rejection: JsonRejection) -> Self {
        AlertError::InvalidBody {
            details: rejection.body_text(),
        }
    }
}
