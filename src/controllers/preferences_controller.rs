use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AlertError,
    events,
    models::{AlertFrequency, ImpactLevel},
    services::alert_engine::PreferenceUpdate,
    AppState,
};

fn error_response(err: AlertError) -> Response {
    let status = match err {
        AlertError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        AlertError::PersistenceRead(_) | AlertError::PersistenceWrite(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

// Only a persisted change is announced; a rejected write left nothing new.
fn updated(state: &AppState, result: Result<PreferenceUpdate, AlertError>) -> Response {
    match result {
        Ok(update) => {
            if update.persisted {
                events::notify_preferences_updated(state);
            }
            (StatusCode::OK, Json(update.preferences)).into_response()
        }
        Err(e) => error_response(e),
    }
}

// GET /preferences
pub async fn get_preferences(State(state): State<AppState>) -> Response {
    let prefs = state.engine.preferences().await;
    (StatusCode::OK, Json(prefs)).into_response()
}

// POST /preferences/reload
pub async fn post_reload(State(state): State<AppState>) -> Response {
    let prefs = state.engine.load().await;
    (StatusCode::OK, Json(prefs)).into_response()
}

#[derive(Deserialize)]
pub struct FrequencyForm {
    pub frequency: String,
}

// POST /preferences/frequency
pub async fn post_frequency(
    State(state): State<AppState>,
    Json(form): Json<FrequencyForm>,
) -> Response {
    let frequency: AlertFrequency = match form.frequency.parse() {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    let result = state.engine.set_alert_frequency(frequency).await;
    updated(&state, result)
}

#[derive(Deserialize)]
pub struct CommoditiesForm {
    pub commodities: Vec<String>,
}

// POST /preferences/commodities
pub async fn post_commodities(
    State(state): State<AppState>,
    Json(form): Json<CommoditiesForm>,
) -> Response {
    let result = state.engine.set_commodity_filters(&form.commodities).await;
    updated(&state, result)
}

#[derive(Deserialize)]
pub struct MinImpactForm {
    #[serde(rename = "minImpact")]
    pub min_impact: String,
}

// POST /preferences/min-impact
pub async fn post_min_impact(
    State(state): State<AppState>,
    Json(form): Json<MinImpactForm>,
) -> Response {
    let level: ImpactLevel = match form.min_impact.parse() {
        Ok(l) => l,
        Err(e) => return error_response(e),
    };

    let result = state.engine.set_minimum_impact(level).await;
    updated(&state, result)
}

// POST /preferences/timestamp-format/toggle
pub async fn post_toggle_timestamp_format(State(state): State<AppState>) -> Response {
    let result = state.engine.toggle_timestamp_format().await;
    updated(&state, result)
}
