use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use commoditypulse::{
    error::{AlertError, StoreError},
    models::{AlertFrequency, AlertPreferences, Decision, ImpactLevel, MarketEvent},
    services::{
        alert_engine::{decide, AlertDecisionEngine, EngineConfig, DEFAULT_STORAGE_KEY},
        clock::ManualClock,
        kv_store::{KvStore, MemoryStore},
    },
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
}

fn engine(store: Arc<dyn KvStore>, clock: Arc<ManualClock>) -> AlertDecisionEngine {
    AlertDecisionEngine::new(store, clock, EngineConfig::default())
}

fn event(commodities: &[&str], impact: Option<ImpactLevel>) -> MarketEvent {
    MarketEvent {
        commodities: Some(commodities.iter().map(|c| c.to_string()).collect()),
        market_impact: impact,
        ..MarketEvent::default()
    }
}

/// Reads succeed with nothing stored; every write fails.
struct ReadOnlyStore;

#[async_trait]
impl KvStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

/// Memory-backed store whose reads can be switched off.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }
}

struct UnreachableStore;

#[async_trait]
impl KvStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

#[tokio::test]
async fn load_without_stored_record_yields_defaults() {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine(Arc::new(MemoryStore::new()), clock);

    assert!(!engine.is_loaded());
    let prefs = engine.load().await;
    assert!(engine.is_loaded());

    assert_eq!(prefs.frequency, AlertFrequency::Realtime);
    assert_eq!(prefs.last_alert_time, None);
    assert!(prefs.commodity_filters.is_empty());
    assert_eq!(prefs.min_impact, ImpactLevel::Low);
    assert!(!prefs.show_exact_time);
}

#[tokio::test]
async fn load_replaces_malformed_record_with_defaults() {
    let store = Arc::new(MemoryStore::new());
    store.set(DEFAULT_STORAGE_KEY, "{not json").await.unwrap();

    let engine = engine(store, Arc::new(ManualClock::new(start())));
    assert_eq!(engine.load().await, AlertPreferences::default());
}

#[tokio::test]
async fn load_rejects_unknown_enum_values() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(DEFAULT_STORAGE_KEY, r#"{"frequency":"HOURLY","showExactTime":true}"#)
        .await
        .unwrap();

    let engine = engine(store, Arc::new(ManualClock::new(start())));
    assert_eq!(engine.load().await, AlertPreferences::default());
}

#[tokio::test]
async fn load_fills_missing_fields_with_defaults() {
    let store = Arc::new(MemoryStore::new());
    store
        .set(DEFAULT_STORAGE_KEY, r#"{"minImpact":"HIGH","extra":42}"#)
        .await
        .unwrap();

    let engine = engine(store, Arc::new(ManualClock::new(start())));
    let prefs = engine.load().await;

    assert_eq!(prefs.min_impact, ImpactLevel::High);
    assert_eq!(prefs.frequency, AlertFrequency::Realtime);
    assert!(prefs.commodity_filters.is_empty());
}

#[tokio::test]
async fn load_survives_store_read_failure() {
    let engine = engine(Arc::new(UnreachableStore), Arc::new(ManualClock::new(start())));
    assert_eq!(engine.load().await, AlertPreferences::default());
    assert!(engine.is_loaded());
}

#[tokio::test]
async fn high_impact_bypasses_throttle_in_realtime_mode() {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine(Arc::new(MemoryStore::new()), clock.clone());
    engine.load().await;

    // re-arms the throttle at "now": zero elapsed
    engine.set_alert_frequency(AlertFrequency::Realtime).await.unwrap();

    let high = event(&["Copper"], Some(ImpactLevel::High));
    let medium = event(&["Copper"], Some(ImpactLevel::Medium));

    assert!(engine.should_show_alert(&high).await);
    assert_eq!(engine.evaluate(&high).await, Decision::Bypass);
    assert!(!engine.should_show_alert(&medium).await);
}

#[tokio::test]
async fn high_impact_bypass_ignores_commodity_filters() {
    let prefs = AlertPreferences {
        commodity_filters: vec!["Gold".to_string()],
        last_alert_time: Some(start()),
        ..AlertPreferences::default()
    };

    let wheat = event(&["Wheat"], Some(ImpactLevel::High));
    assert_eq!(decide(&prefs, &wheat, start()), Decision::Bypass);
}

#[tokio::test]
async fn daily_throttle_opens_after_twenty_four_hours() {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine(Arc::new(MemoryStore::new()), clock.clone());
    engine.load().await;
    engine.set_alert_frequency(AlertFrequency::Daily).await.unwrap();

    let medium = event(&[], Some(ImpactLevel::Medium));

    clock.advance(Duration::hours(23) + Duration::minutes(59));
    assert!(!engine.should_show_alert(&medium).await);
    assert_eq!(engine.evaluate(&medium).await, Decision::Throttled);

    clock.advance(Duration::minutes(2));
    assert!(engine.should_show_alert(&medium).await);
}

#[tokio::test]
async fn weekly_high_impact_is_still_throttled() {
    let prefs = AlertPreferences {
        frequency: AlertFrequency::Weekly,
        last_alert_time: Some(start()),
        ..AlertPreferences::default()
    };
    let high = event(&[], Some(ImpactLevel::High));

    assert_eq!(decide(&prefs, &high, start() + Duration::days(6)), Decision::Throttled);
    assert_eq!(decide(&prefs, &high, start() + Duration::days(7)), Decision::Accepted);
}

#[tokio::test]
async fn commodity_filter_requires_an_overlap() {
    let prefs = AlertPreferences {
        frequency: AlertFrequency::Daily,
        commodity_filters: vec!["Gold".to_string(), "Oil".to_string()],
        ..AlertPreferences::default()
    };
    let now = start();

    for impact in [ImpactLevel::Low, ImpactLevel::Medium, ImpactLevel::High] {
        let wheat = event(&["Wheat"], Some(impact));
        assert_eq!(decide(&prefs, &wheat, now), Decision::FilteredOut);
    }

    let oil_and_wheat = event(&["Oil", "Wheat"], Some(ImpactLevel::Low));
    assert_eq!(decide(&prefs, &oil_and_wheat, now), Decision::Accepted);

    let lowercase = event(&["oil"], Some(ImpactLevel::Low));
    assert_eq!(decide(&prefs, &lowercase, now), Decision::Accepted);

    let untagged = MarketEvent {
        market_impact: Some(ImpactLevel::Medium),
        ..MarketEvent::default()
    };
    assert_eq!(decide(&prefs, &untagged, now), Decision::FilteredOut);
}

#[tokio::test]
async fn impact_floor_follows_low_medium_high_order() {
    let prefs = AlertPreferences {
        min_impact: ImpactLevel::Medium,
        ..AlertPreferences::default()
    };
    let now = start();

    let low = event(&[], Some(ImpactLevel::Low));
    let medium = event(&[], Some(ImpactLevel::Medium));
    let high = event(&[], Some(ImpactLevel::High));
    let unknown = event(&[], None);

    assert_eq!(decide(&prefs, &low, now), Decision::BelowImpactFloor);
    assert!(decide(&prefs, &medium, now).is_shown());
    assert!(decide(&prefs, &high, now).is_shown());
    assert_eq!(decide(&prefs, &unknown, now), Decision::BelowImpactFloor);
}

#[tokio::test]
async fn toggling_timestamp_format_twice_restores_it() {
    let engine = engine(Arc::new(MemoryStore::new()), Arc::new(ManualClock::new(start())));
    let original = engine.load().await.show_exact_time;

    let once = engine.toggle_timestamp_format().await.unwrap().preferences;
    assert_eq!(once.show_exact_time, !original);

    let twice = engine.toggle_timestamp_format().await.unwrap().preferences;
    assert_eq!(twice.show_exact_time, original);
}

#[tokio::test]
async fn commodity_filters_survive_restart() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start()));

    let first = engine(store.clone(), clock.clone());
    first.load().await;
    first.set_minimum_impact(ImpactLevel::Medium).await.unwrap();
    first.toggle_timestamp_format().await.unwrap();
    let before = first.set_commodity_filters(&["Silver"]).await.unwrap().preferences;

    let restarted = engine(store, clock);
    let after = restarted.load().await;

    assert_eq!(after.commodity_filters, vec!["Silver".to_string()]);
    assert_eq!(after, before);
    assert_eq!(after.min_impact, ImpactLevel::Medium);
    assert!(after.show_exact_time);
}

#[tokio::test]
async fn set_frequency_rearms_throttle_from_now() {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine(Arc::new(MemoryStore::new()), clock.clone());
    engine.load().await;

    clock.advance(Duration::minutes(30));
    let prefs = engine
        .set_alert_frequency(AlertFrequency::Weekly)
        .await
        .unwrap()
        .preferences;

    assert_eq!(prefs.frequency, AlertFrequency::Weekly);
    assert_eq!(prefs.last_alert_time, Some(start() + Duration::minutes(30)));
}

#[tokio::test]
async fn evaluation_never_advances_the_throttle_clock() {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine(Arc::new(MemoryStore::new()), clock.clone());
    engine.load().await;

    let medium = event(&[], Some(ImpactLevel::Medium));
    assert!(engine.should_show_alert(&medium).await);
    assert!(engine.should_show_alert(&medium).await);
    assert_eq!(engine.preferences().await.last_alert_time, None);
}

#[tokio::test]
async fn recording_an_alert_closes_the_realtime_window_for_five_minutes() {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine(Arc::new(MemoryStore::new()), clock.clone());
    engine.load().await;

    let medium = event(&[], Some(ImpactLevel::Medium));
    assert!(engine.should_show_alert(&medium).await);

    let update = engine.record_alert_shown().await;
    assert!(update.persisted);
    let prefs = update.preferences;
    assert_eq!(prefs.last_alert_time, Some(start()));
    assert!(!engine.should_show_alert(&medium).await);

    clock.advance(Duration::minutes(4));
    assert!(!engine.should_show_alert(&medium).await);

    clock.advance(Duration::minutes(1));
    assert!(engine.should_show_alert(&medium).await);
}

#[tokio::test]
async fn write_failure_keeps_previous_preferences() {
    let engine = engine(Arc::new(ReadOnlyStore), Arc::new(ManualClock::new(start())));
    engine.load().await;

    let update = engine.toggle_timestamp_format().await.unwrap();
    assert!(!update.persisted);
    assert!(!update.preferences.show_exact_time);

    let update = engine.set_commodity_filters(&["Gold"]).await.unwrap();
    assert!(!update.persisted);
    assert!(update.preferences.commodity_filters.is_empty());

    assert_eq!(engine.preferences().await, AlertPreferences::default());
}

#[tokio::test]
async fn recording_an_alert_advances_throttle_even_if_write_fails() {
    let clock = Arc::new(ManualClock::new(start()));
    let engine = engine(Arc::new(ReadOnlyStore), clock.clone());
    engine.load().await;

    let update = engine.record_alert_shown().await;
    assert!(!update.persisted);
    assert_eq!(update.preferences.last_alert_time, Some(start()));

    let medium = event(&[], Some(ImpactLevel::Medium));
    assert!(!engine.should_show_alert(&medium).await);

    clock.advance(Duration::minutes(5));
    assert!(engine.should_show_alert(&medium).await);
}

#[tokio::test]
async fn failed_reload_keeps_last_known_good_preferences() {
    let store = Arc::new(FlakyStore::default());
    let engine = engine(store.clone(), Arc::new(ManualClock::new(start())));
    engine.load().await;

    engine.set_minimum_impact(ImpactLevel::High).await.unwrap();
    engine.set_commodity_filters(&["Gold"]).await.unwrap();

    store.fail_reads.store(true, Ordering::SeqCst);
    let reloaded = engine.load().await;
    assert_eq!(reloaded.commodity_filters, vec!["Gold".to_string()]);
    assert_eq!(reloaded.min_impact, ImpactLevel::High);

    store.fail_reads.store(false, Ordering::SeqCst);
    let update = engine.toggle_timestamp_format().await.unwrap();
    assert!(update.persisted);

    let raw = store.inner.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["commodityFilters"], serde_json::json!(["Gold"]));
    assert_eq!(value["minImpact"], "HIGH");
    assert_eq!(value["showExactTime"], true);
}

#[tokio::test]
async fn blank_commodity_name_is_invalid_argument() {
    let engine = engine(Arc::new(MemoryStore::new()), Arc::new(ManualClock::new(start())));
    engine.load().await;

    let err = engine.set_commodity_filters(&["Gold", "   "]).await.unwrap_err();
    assert!(matches!(err, AlertError::InvalidArgument(_)));
    assert!(engine.preferences().await.commodity_filters.is_empty());
}

#[tokio::test]
async fn commodity_filters_are_trimmed_and_deduplicated() {
    let engine = engine(Arc::new(MemoryStore::new()), Arc::new(ManualClock::new(start())));
    engine.load().await;

    let prefs = engine
        .set_commodity_filters(&[" Gold ", "gold", "Oil"])
        .await
        .unwrap()
        .preferences;

    assert_eq!(prefs.commodity_filters, vec!["Gold".to_string(), "Oil".to_string()]);
}

#[tokio::test]
async fn unknown_enum_strings_are_rejected_at_parse_time() {
    assert!(matches!(
        "HOURLY".parse::<AlertFrequency>(),
        Err(AlertError::InvalidArgument(_))
    ));
    assert!(matches!(
        "CRITICAL".parse::<ImpactLevel>(),
        Err(AlertError::InvalidArgument(_))
    ));
    assert_eq!("daily".parse::<AlertFrequency>().unwrap(), AlertFrequency::Daily);
    assert_eq!(" High ".parse::<ImpactLevel>().unwrap(), ImpactLevel::High);
}

#[tokio::test]
async fn persisted_record_uses_stable_field_names() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine(store.clone(), Arc::new(ManualClock::new(start())));
    engine.load().await;
    engine.set_alert_frequency(AlertFrequency::Daily).await.unwrap();

    let raw = store.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value["frequency"], "DAILY");
    assert_eq!(value["minImpact"], "LOW");
    assert_eq!(value["showExactTime"], false);
    assert!(value["commodityFilters"].as_array().unwrap().is_empty());
    assert!(value["lastAlertTime"].is_string());
}
