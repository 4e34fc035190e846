use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::MarketEvent,
    services::time_format::format_alert_time,
    AppState,
};

#[derive(Deserialize)]
pub struct EvaluateForm {
    pub event: MarketEvent,
}

// POST /alerts/evaluate
pub async fn post_evaluate(
    State(state): State<AppState>,
    Json(form): Json<EvaluateForm>,
) -> Response {
    let decision = state.engine.evaluate(&form.event).await;

    (
        StatusCode::OK,
        Json(json!({
            "show": decision.is_shown(),
            "decision": decision,
        })),
    )
        .into_response()
}

// POST /alerts/shown
pub async fn post_alert_shown(State(state): State<AppState>) -> Response {
    let update = state.engine.record_alert_shown().await;
    let prefs = update.preferences;

    let now = state.engine.now();
    let last_alert = prefs
        .last_alert_time
        .map(|ts| format_alert_time(ts, now, prefs.show_exact_time));

    (
        StatusCode::OK,
        Json(json!({
            "last_alert": last_alert,
            "persisted": update.persisted,
            "preferences": prefs,
        })),
    )
        .into_response()
}
