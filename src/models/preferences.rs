use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AlertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertFrequency {
    #[default]
    Realtime,
    Daily,
    Weekly,
}

impl AlertFrequency {
    /// Minimum spacing between two accepted alerts.
    pub fn min_interval(self) -> Duration {
        match self {
            AlertFrequency::Realtime => Duration::minutes(5),
            AlertFrequency::Daily => Duration::hours(24),
            AlertFrequency::Weekly => Duration::days(7),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertFrequency::Realtime => "REALTIME",
            AlertFrequency::Daily => "DAILY",
            AlertFrequency::Weekly => "WEEKLY",
        }
    }
}

impl fmt::Display for AlertFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertFrequency {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REALTIME" => Ok(AlertFrequency::Realtime),
            "DAILY" => Ok(AlertFrequency::Daily),
            "WEEKLY" => Ok(AlertFrequency::Weekly),
            other => Err(AlertError::InvalidArgument(format!(
                "unknown alert frequency '{other}'"
            ))),
        }
    }
}

// Variant order is the severity order: Low < Medium < High.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImpactLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ImpactLevel::Low => "LOW",
            ImpactLevel::Medium => "MEDIUM",
            ImpactLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(ImpactLevel::Low),
            "MEDIUM" => Ok(ImpactLevel::Medium),
            "HIGH" => Ok(ImpactLevel::High),
            other => Err(AlertError::InvalidArgument(format!(
                "unknown impact level '{other}'"
            ))),
        }
    }
}

/// The single per-installation preference record.
///
/// Serialized with the exact field names the record has always been stored
/// under. Fields missing from a stored record fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertPreferences {
    pub frequency: AlertFrequency,
    pub last_alert_time: Option<DateTime<Utc>>,
    pub commodity_filters: Vec<String>,
    pub min_impact: ImpactLevel,
    pub show_exact_time: bool,
}

impl AlertPreferences {
    /// Changing the frequency re-arms the throttle from `now`.
    pub fn with_frequency(&self, frequency: AlertFrequency, now: DateTime<Utc>) -> Self {
        Self {
            frequency,
            last_alert_time: Some(now),
            ..self.clone()
        }
    }

    /// Trims, drops case-insensitive duplicates and rejects blank names.
    pub fn with_commodity_filters<I, S>(&self, filters: I) -> Result<Self, AlertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for raw in filters {
            let name = raw.as_ref().trim();
            if name.is_empty() {
                return Err(AlertError::InvalidArgument(
                    "commodity filter names must not be blank".to_string(),
                ));
            }
            if !cleaned.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                cleaned.push(name.to_string());
            }
        }

        Ok(Self {
            commodity_filters: cleaned,
            ..self.clone()
        })
    }

    pub fn with_min_impact(&self, min_impact: ImpactLevel) -> Self {
        Self {
            min_impact,
            ..self.clone()
        }
    }

    pub fn with_timestamp_format_toggled(&self) -> Self {
        Self {
            show_exact_time: !self.show_exact_time,
            ..self.clone()
        }
    }

    pub fn with_alert_recorded(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_alert_time: Some(now),
            ..self.clone()
        }
    }

    /// Whether the throttle window derived from `frequency` has elapsed.
    /// A record that never accepted an alert is always open.
    pub fn throttle_open(&self, now: DateTime<Utc>) -> bool {
        match self.last_alert_time {
            None => true,
            Some(last) => now.signed_duration_since(last) >= self.frequency.min_interval(),
        }
    }

    pub fn tracks_commodity(&self, commodity: &str) -> bool {
        let commodity = commodity.trim();
        self.commodity_filters
            .iter()
            .any(|f| f.eq_ignore_ascii_case(commodity))
    }
}
