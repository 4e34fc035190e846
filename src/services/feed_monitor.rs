use std::{
    collections::{HashSet, VecDeque},
    time::Duration,
};

use chrono::DateTime;
use serde_json::json;
use tokio::time;

use crate::{
    events::{self, ServerEvent},
    models::MarketEvent,
    services::time_format::format_alert_time,
    AppState,
};

const SEEN_CAPACITY: usize = 512;

/// Bounded memory of feed items already evaluated, oldest forgotten first.
#[derive(Debug)]
pub struct SeenEvents {
    keys: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenEvents {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Returns false if `key` was already present.
    pub fn insert(&mut self, key: String) -> bool {
        if self.keys.contains(&key) {
            return false;
        }

        if self.order.len() >= self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.keys.remove(&old);
            }
        }

        self.keys.insert(key.clone());
        self.order.push_back(key);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for SeenEvents {
    fn default() -> Self {
        Self::new(SEEN_CAPACITY)
    }
}

pub fn spawn_feed_monitor(state: AppState) {
    tokio::spawn(async move {
        let secs = state.settings.feed_poll_secs.max(1);
        let mut interval = time::interval(Duration::from_secs(secs));
        let mut seen = SeenEvents::default();

        tracing::info!("feed monitor polling every {}s", secs);

        loop {
            interval.tick().await;

            if let Err(e) = run_tick(&state, &mut seen).await {
                tracing::warn!("[feed-monitor] tick error: {}", e);
            }
        }
    });
}

async fn run_tick(state: &AppState, seen: &mut SeenEvents) -> Result<(), String> {
    let items = state.feed.latest().await?;
    let shown = process_events(state, &items, seen).await;

    if shown > 0 {
        tracing::info!("[feed-monitor] surfaced {} alert(s)", shown);
    }

    Ok(())
}

/// Evaluates each unseen event, records every accepted one and broadcasts an
/// `alertShown` event for it. Returns how many alerts were surfaced.
///
/// Items without an id or title cannot be remembered and are evaluated on
/// every call.
pub async fn process_events(
    state: &AppState,
    items: &[MarketEvent],
    seen: &mut SeenEvents,
) -> usize {
    let mut shown = 0;

    for item in items {
        if let Some(key) = item.dedupe_key() {
            if !seen.insert(key) {
                continue;
            }
        }

        if !state.engine.should_show_alert(item).await {
            continue;
        }

        let update = state.engine.record_alert_shown().await;
        if !update.persisted {
            tracing::warn!("[feed-monitor] alert time kept in memory only, store write failed");
        }
        let prefs = update.preferences;

        let now = state.engine.now();
        let at = item
            .published_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(now);

        events::notify(
            state,
            ServerEvent::new(
                "alertShown",
                json!({
                    "id": item.id,
                    "title": item.title,
                    "commodities": item.commodities,
                    "market_impact": item.market_impact,
                    "time": format_alert_time(at, now, prefs.show_exact_time),
                }),
            ),
        );

        shown += 1;
    }

    shown
}
