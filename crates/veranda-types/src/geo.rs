use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of one precise-geolocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStatus {
    /// Coordinates were obtained.
    Success,
    /// The call returned but carried no coordinates (denied, or no fix).
    NoDataOrDenied,
    /// The environment has no geolocation capability.
    Unsupported,
    /// The call was rejected or raised.
    Error,
}

/// Coordinates as reported by the client-side geolocation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Capture time reported by the capability, milliseconds since epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

/// Error descriptor recorded under a provider's key when its lookup fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// HTTP status, when the provider answered at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

/// What one IP-geolocation provider produced: its JSON payload as-is, or
/// the failure that stands in for it. Failures are data, not exceptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderReading {
    Failed { error: ProviderFailure },
    Payload(serde_json::Value),
}

impl ProviderReading {
    pub fn failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Failed {
            error: ProviderFailure {
                status,
                message: message.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One precise-geolocation attempt with its classification.
///
/// Invariant: `coords` is present exactly when `status` is `Success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserFix {
    pub status: FixStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Server-side wall clock at classification time.
    pub captured_at: DateTime<Utc>,
}

/// Aggregated location data for one acquisition (a visit or a message).
///
/// `providers` holds one entry per configured IP provider, success or
/// failure; nothing is silently dropped. `browser` is absent when precise
/// geolocation was not attempted (consent not granted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub providers: BTreeMap<String, ProviderReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserFix>,
}

impl GeoRecord {
    /// Number of providers whose lookup failed.
    pub fn failed_providers(&self) -> usize {
        self.providers.values().filter(|r| r.is_failed()).count()
    }
}
