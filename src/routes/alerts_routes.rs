use axum::{Router, routing::post};
use crate::{AppState, controllers::alerts_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/alerts/evaluate", post(alerts_controller::post_evaluate))
        .route("/alerts/shown", post(alerts_controller::post_alert_shown))
}
