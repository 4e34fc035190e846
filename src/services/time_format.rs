use chrono::{DateTime, Utc};

/// Renders an alert timestamp either as exact UTC or relative to `now`,
/// following the `showExactTime` preference.
pub fn format_alert_time(ts: DateTime<Utc>, now: DateTime<Utc>, exact: bool) -> String {
    if exact {
        return ts.format("%Y-%m-%d %H:%M UTC").to_string();
    }

    let elapsed = now.signed_duration_since(ts);
    let mins = elapsed.num_minutes();

    if mins < 1 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}
