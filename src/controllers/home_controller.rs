use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::AppState;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

// Reads the preference key once to prove the configured store answers.
pub async fn health_store(State(state): State<AppState>) -> impl IntoResponse {
    let key = state.engine.config().storage_key.clone();

    match state.engine.store().get(&key).await {
        Ok(found) => (
            StatusCode::OK,
            Json(json!({
                "store": "ok",
                "has_preferences": found.is_some(),
                "loaded": state.engine.is_loaded(),
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "store": "error", "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no route for {}", uri.path()) })),
    )
}
