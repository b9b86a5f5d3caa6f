use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::warn;
use veranda_types::{BrowserFix, FixStatus, GeoRecord, ProviderReading};

use crate::bridge::{BridgeOutcome, GeoBridge};
use crate::provider::{self, ProviderSpec};

/// Fan out to every IP provider (and, when asked, the precise-geolocation
/// bridge), wait for all of them, and fold the results into one record.
///
/// Lookups run concurrently, each bounded by its own timeout; a slow or
/// failing provider cannot delay or abort its siblings, so the whole
/// acquisition finishes within the slowest single timeout plus overhead.
/// This function never fails: the returned record carries one entry per
/// provider, with failures recorded under the provider's key.
pub async fn acquire<B: GeoBridge>(
    providers: &[ProviderSpec],
    bridge: &B,
    want_precise: bool,
    precise_timeout: Duration,
) -> GeoRecord {
    let names: Vec<String> = providers.iter().map(|spec| spec.name.clone()).collect();

    let lookups = providers.iter().map(|spec| {
        let spec = spec.clone();
        tokio::spawn(async move { provider::lookup(&spec).await })
    });

    let browser = async {
        if want_precise {
            Some(precise_fix(bridge, precise_timeout).await)
        } else {
            None
        }
    };

    let (joined, browser) = tokio::join!(join_all(lookups), browser);

    let mut readings = BTreeMap::new();
    for (name, result) in names.into_iter().zip(joined) {
        let reading = match result {
            Ok(reading) => reading,
            // `lookup` never panics; a lost task still gets an entry so the
            // record always covers every configured provider.
            Err(e) => ProviderReading::failed(None, format!("lookup task failed: {e}")),
        };
        if let ProviderReading::Failed { error } = &reading {
            warn!(provider = %name, status = ?error.status, "IP lookup failed: {}", error.message);
        }
        readings.insert(name, reading);
    }

    GeoRecord {
        providers: readings,
        browser,
    }
}

/// Run one bridge request and classify the outcome.
async fn precise_fix<B: GeoBridge>(bridge: &B, timeout: Duration) -> BrowserFix {
    let outcome = match tokio::time::timeout(timeout, bridge.current_position(timeout)).await {
        Ok(outcome) => outcome,
        Err(_) => BridgeOutcome::Failed("timeout".into()),
    };

    let captured_at = Utc::now();
    match outcome {
        BridgeOutcome::Position(coords) => BrowserFix {
            status: FixStatus::Success,
            coords: Some(coords),
            error: None,
            captured_at,
        },
        BridgeOutcome::NoPosition => BrowserFix {
            status: FixStatus::NoDataOrDenied,
            coords: None,
            error: None,
            captured_at,
        },
        BridgeOutcome::Unsupported => BrowserFix {
            status: FixStatus::Unsupported,
            coords: None,
            error: None,
            captured_at,
        },
        BridgeOutcome::Failed(message) => BrowserFix {
            status: FixStatus::Error,
            coords: None,
            error: Some(message),
            captured_at,
        },
    }
}
