use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;
use veranda_geo::ConsentGate;

/// Per-session context threaded through the core components.
///
/// Replaces the ambient page-state flags of the old model: created once per
/// client session, discarded at session end, never shared across sessions.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub consent: ConsentGate,
    visit_logged: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            consent: ConsentGate::new(),
            visit_logged: AtomicBool::new(false),
        }
    }

    /// Claim the session's single visit slot. The first caller gets `true`,
    /// everyone after gets `false`. The slot is not released on a failed
    /// append; a lost visit is logged, not retried.
    pub fn claim_visit_slot(&self) -> bool {
        !self.visit_logged.swap(true, Ordering::AcqRel)
    }

    pub fn visit_logged(&self) -> bool {
        self.visit_logged.load(Ordering::Acquire)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_slot_claimed_once() {
        let session = Session::new();
        assert!(!session.visit_logged());
        assert!(session.claim_visit_slot());
        assert!(!session.claim_visit_slot());
        assert!(session.visit_logged());
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(Session::new().id, Session::new().id);
    }
}
