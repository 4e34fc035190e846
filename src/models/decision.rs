use serde::Serialize;

/// Outcome of evaluating one event against the current preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// High-impact event in realtime mode; skips every other gate.
    Bypass,
    Throttled,
    FilteredOut,
    BelowImpactFloor,
    Accepted,
}

impl Decision {
    pub fn is_shown(self) -> bool {
        matches!(self, Decision::Bypass | Decision::Accepted)
    }
}
