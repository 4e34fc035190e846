use serde::{Deserialize, Serialize};

use super::ImpactLevel;

/// A news/market item as delivered by the feed. Only `commodities` and
/// `market_impact` take part in the alert decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub commodities: Option<Vec<String>>,

    #[serde(default)]
    pub market_impact: Option<ImpactLevel>,

    // unix seconds
    #[serde(default)]
    pub published_at: Option<i64>,
}

impl MarketEvent {
    /// Stable identity used to avoid surfacing the same item twice.
    pub fn dedupe_key(&self) -> Option<String> {
        self.id
            .as_deref()
            .or(self.title.as_deref())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
