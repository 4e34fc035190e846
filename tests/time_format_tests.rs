use chrono::{Duration, TimeZone, Utc};
use commoditypulse::services::time_format::format_alert_time;

#[test]
fn exact_format_is_utc_minutes() {
    let ts = Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 41).unwrap();
    assert_eq!(format_alert_time(ts, ts, true), "2026-03-02 09:05 UTC");
}

#[test]
fn relative_format_picks_the_largest_unit() {
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    assert_eq!(format_alert_time(now - Duration::seconds(30), now, false), "just now");
    assert_eq!(format_alert_time(now - Duration::minutes(7), now, false), "7m ago");
    assert_eq!(format_alert_time(now - Duration::hours(5), now, false), "5h ago");
    assert_eq!(format_alert_time(now - Duration::days(3), now, false), "3d ago");
}

#[test]
fn future_timestamps_read_as_just_now() {
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    assert_eq!(format_alert_time(now + Duration::hours(2), now, false), "just now");
}
