//! Alert eligibility and preference persistence.
//!
//! The engine is the single owner of the in-memory [`AlertPreferences`]. Every
//! mutation takes the owner lock, builds the candidate record, writes it through
//! the [`KvStore`] and only then swaps it in, so concurrent callers are
//! serialized and a failed write leaves the previous record in place. Recording a
//! shown alert is the one exception: its throttle clock moves forward in memory
//! regardless.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    error::AlertError,
    models::{AlertFrequency, AlertPreferences, Decision, ImpactLevel, MarketEvent},
    services::{clock::Clock, kv_store::KvStore},
};

/// Outcome of one preference mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceUpdate {
    pub preferences: AlertPreferences,
    /// False when the store rejected the write.
    pub persisted: bool,
}

pub const DEFAULT_STORAGE_KEY: &str = "alertPreferences";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Evaluates `event` against `prefs` at instant `now`. First matching rule wins.
pub fn decide(prefs: &AlertPreferences, event: &MarketEvent, now: DateTime<Utc>) -> Decision {
    if event.market_impact == Some(ImpactLevel::High)
        && prefs.frequency == AlertFrequency::Realtime
    {
        return Decision::Bypass;
    }

    if !prefs.throttle_open(now) {
        return Decision::Throttled;
    }

    if !prefs.commodity_filters.is_empty() {
        let hit = event
            .commodities
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|c| prefs.tracks_commodity(c));

        if !hit {
            return Decision::FilteredOut;
        }
    }

    // an event without an impact never clears the floor
    match event.market_impact {
        Some(impact) if impact >= prefs.min_impact => Decision::Accepted,
        _ => Decision::BelowImpactFloor,
    }
}

pub struct AlertDecisionEngine {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    prefs: Mutex<AlertPreferences>,
    loaded: AtomicBool,
}

impl AlertDecisionEngine {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
            prefs: Mutex::new(AlertPreferences::default()),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// True once `load()` has completed at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Snapshot of the in-memory record.
    pub async fn preferences(&self) -> AlertPreferences {
        self.prefs.lock().await.clone()
    }

    /// Reads the persisted record. An absent or malformed record yields the
    /// default record. If the store itself cannot be read, the last known good
    /// record is kept, or defaults on the very first load. Nothing here is an
    /// error for the caller.
    pub async fn load(&self) -> AlertPreferences {
        let mut current = self.prefs.lock().await;
        let key = &self.config.storage_key;

        let loaded = match self.read_raw().await {
            Ok(Some(raw)) => match serde_json::from_str::<AlertPreferences>(&raw) {
                Ok(p) => p,
                Err(e) => {
                    let e = AlertError::PersistenceRead(format!("malformed record: {e}"));
                    tracing::warn!(key = %key, error = %e, "falling back to default preferences");
                    AlertPreferences::default()
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "no stored preferences, using defaults");
                AlertPreferences::default()
            }
            Err(e) if self.is_loaded() => {
                tracing::warn!(key = %key, error = %e, "keeping last known good preferences");
                current.clone()
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "falling back to default preferences");
                AlertPreferences::default()
            }
        };

        *current = loaded.clone();
        self.loaded.store(true, Ordering::Release);
        loaded
    }

    async fn read_raw(&self) -> Result<Option<String>, AlertError> {
        self.store
            .get(&self.config.storage_key)
            .await
            .map_err(|e| AlertError::PersistenceRead(e.to_string()))
    }

    async fn write_persisted(&self, prefs: &AlertPreferences) -> Result<(), AlertError> {
        let json = serde_json::to_string(prefs)
            .map_err(|e| AlertError::PersistenceWrite(e.to_string()))?;

        self.store
            .set(&self.config.storage_key, &json)
            .await
            .map_err(|e| AlertError::PersistenceWrite(e.to_string()))
    }

    /// Writes `candidate` and decides what the in-memory record becomes. On a
    /// failed write the previous record stays, unless `keep_on_failure` is set.
    async fn commit(
        &self,
        current: &mut AlertPreferences,
        candidate: AlertPreferences,
        keep_on_failure: bool,
    ) -> PreferenceUpdate {
        let persisted = match self.write_persisted(&candidate).await {
            Ok(()) => true,
            Err(e) if keep_on_failure => {
                tracing::warn!(key = %self.config.storage_key, error = %e, "preferences changed in memory only");
                false
            }
            Err(e) => {
                tracing::warn!(key = %self.config.storage_key, error = %e, "keeping previous preferences");
                false
            }
        };

        if persisted || keep_on_failure {
            *current = candidate;
        }

        PreferenceUpdate {
            preferences: current.clone(),
            persisted,
        }
    }

    /// Runs one read-merge-write under the owner lock. The candidate replaces
    /// the in-memory record only if the write succeeds.
    async fn update<F>(&self, merge: F) -> Result<PreferenceUpdate, AlertError>
    where
        F: FnOnce(&AlertPreferences, DateTime<Utc>) -> Result<AlertPreferences, AlertError>,
    {
        let mut current = self.prefs.lock().await;
        let candidate = merge(&*current, self.clock.now())?;

        Ok(self.commit(&mut *current, candidate, false).await)
    }

    /// Sets the frequency and re-arms the throttle from now.
    pub async fn set_alert_frequency(
        &self,
        frequency: AlertFrequency,
    ) -> Result<PreferenceUpdate, AlertError> {
        self.update(|p, now| Ok(p.with_frequency(frequency, now)))
            .await
    }

    pub async fn set_commodity_filters<S: AsRef<str>>(
        &self,
        filters: &[S],
    ) -> Result<PreferenceUpdate, AlertError> {
        self.update(|p, _| p.with_commodity_filters(filters)).await
    }

    pub async fn set_minimum_impact(
        &self,
        level: ImpactLevel,
    ) -> Result<PreferenceUpdate, AlertError> {
        self.update(|p, _| Ok(p.with_min_impact(level))).await
    }

    pub async fn toggle_timestamp_format(&self) -> Result<PreferenceUpdate, AlertError> {
        self.update(|p, _| Ok(p.with_timestamp_format_toggled()))
            .await
    }

    /// Advances the throttle clock after an alert was actually surfaced.
    /// `should_show_alert` never does this on its own.
    ///
    /// The in-memory clock advances even if the write fails, so an unreachable
    /// store cannot hold the throttle window open.
    pub async fn record_alert_shown(&self) -> PreferenceUpdate {
        let mut current = self.prefs.lock().await;
        let candidate = current.with_alert_recorded(self.clock.now());

        self.commit(&mut *current, candidate, true).await
    }

    pub async fn evaluate(&self, event: &MarketEvent) -> Decision {
        let prefs = self.prefs.lock().await;
        let decision = decide(&prefs, event, self.clock.now());
        tracing::debug!(?decision, event_id = ?event.id, "alert decision");
        decision
    }

    /// Pure read: does not touch `last_alert_time`.
    pub async fn should_show_alert(&self, event: &MarketEvent) -> bool {
        self.evaluate(event).await.is_shown()
    }
}
