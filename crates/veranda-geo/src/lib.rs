pub mod aggregator;
pub mod bridge;
pub mod consent;
pub mod provider;

pub use aggregator::acquire;
pub use bridge::{BridgeOutcome, FakeBridge, GeoBridge, UnsupportedBridge};
pub use consent::ConsentGate;
pub use provider::{DEFAULT_LOOKUP_TIMEOUT, ProviderSpec};
