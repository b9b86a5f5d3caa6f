use std::future::Future;
use std::time::Duration;

use veranda_types::Coordinates;

/// Outcome of one client-side geolocation request, before classification.
#[derive(Debug, Clone)]
pub enum BridgeOutcome {
    /// The capability produced coordinates.
    Position(Coordinates),
    /// The call returned without coordinates (permission denied, no fix).
    NoPosition,
    /// The environment has no geolocation capability.
    Unsupported,
    /// The call was rejected or raised.
    Failed(String),
}

/// Client-side precise-geolocation capability.
///
/// The real capability only exists inside a rendering context, so the core
/// takes it as an injected trait; tests run against canned outcomes.
/// Implementations should enforce `timeout` themselves and report expiry as
/// `Failed`; callers keep an outer deadline as a backstop.
pub trait GeoBridge: Send + Sync {
    fn current_position(&self, timeout: Duration) -> impl Future<Output = BridgeOutcome> + Send;
}

/// Stands in when no rendering context is attached (headless or terminal
/// sessions). Always reports the capability as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBridge;

impl GeoBridge for UnsupportedBridge {
    async fn current_position(&self, _timeout: Duration) -> BridgeOutcome {
        BridgeOutcome::Unsupported
    }
}

/// Test bridge returning a canned outcome, optionally after a delay.
#[derive(Debug, Clone)]
pub struct FakeBridge {
    outcome: BridgeOutcome,
    delay: Duration,
}

impl FakeBridge {
    pub fn new(outcome: BridgeOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
        }
    }

    /// Delay the answer, for deadline tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl GeoBridge for FakeBridge {
    async fn current_position(&self, _timeout: Duration) -> BridgeOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}
