use serde_json::json;

use crate::AppState;

/// Named message pushed to every open `/events` stream.
#[derive(Debug, Clone)]
pub struct ServerEvent {
    pub name: String,
    pub data: String,
}

impl ServerEvent {
    pub fn new(name: &str, data: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            data: data.to_string(),
        }
    }
}

pub fn notify(state: &AppState, event: ServerEvent) {
    // no subscribers is fine
    let _ = state.events_tx.send(event);
}

pub fn notify_preferences_updated(state: &AppState) {
    notify(state, ServerEvent::new("preferencesUpdated", json!(1)));
}
