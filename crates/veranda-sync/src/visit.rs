//! Once-per-session visit telemetry.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use veranda_geo::{GeoBridge, ProviderSpec};
use veranda_store::LogStoreClient;
use veranda_types::VisitEvent;

use crate::session::Session;

/// Records a single best-effort visit event per session.
#[derive(Debug)]
pub struct VisitRecorder {
    providers: Vec<ProviderSpec>,
    precise_timeout: Duration,
}

impl VisitRecorder {
    pub fn new(providers: Vec<ProviderSpec>, precise_timeout: Duration) -> Self {
        Self {
            providers,
            precise_timeout,
        }
    }

    /// Record the visit if this session hasn't yet.
    ///
    /// The session's slot is claimed up front, so the write happens at most
    /// once whether or not the append succeeds. IP lookups always run; the
    /// precise fix is only attempted when consent was already granted. A
    /// failed append is reported to the operator log and never retried.
    pub async fn record_once<B: GeoBridge>(
        &self,
        session: &Session,
        store: &LogStoreClient,
        bridge: &B,
    ) {
        if !session.claim_visit_slot() {
            debug!(session = %session.id, "visit already recorded");
            return;
        }

        let geo = veranda_geo::acquire(
            &self.providers,
            bridge,
            session.consent.is_granted(),
            self.precise_timeout,
        )
        .await;

        let visit = VisitEvent {
            session_id: session.id,
            geo,
            created_at: Utc::now(),
        };

        match store.append_visit(&visit).await {
            Ok(()) => debug!(session = %session.id, "visit recorded"),
            Err(e) => warn!(session = %session.id, "visit append failed: {e}"),
        }
    }
}
