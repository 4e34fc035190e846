use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::preferences_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/preferences", get(preferences_controller::get_preferences))
        .route("/preferences/reload", post(preferences_controller::post_reload))
        .route("/preferences/frequency", post(preferences_controller::post_frequency))
        .route("/preferences/commodities", post(preferences_controller::post_commodities))
        .route("/preferences/min-impact", post(preferences_controller::post_min_impact))
        .route(
            "/preferences/timestamp-format/toggle",
            post(preferences_controller::post_toggle_timestamp_format),
        )
}
