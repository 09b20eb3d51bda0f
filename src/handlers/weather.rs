use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    error::AlertError,
    models::{LocationFix, WeatherQuery, WeatherReport},
    AppState,
};

/// Current weather at a point; canned conditions when the live lookup fails
pub async fn current_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherReport>, AlertError> {
    let Query(query) = query
        .map_err(|e| AlertError::Validation(format!("Invalid query: {}", e.body_text())))?;

    if !LocationFix::new(query.lat, query.lng).is_valid() {
        return Err(AlertError::Validation("Invalid location".to_string()));
    }

    Ok(Json(state.weather.current(query.lat, query.lng).await))
}
