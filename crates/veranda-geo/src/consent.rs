use std::sync::atomic::{AtomicBool, Ordering};

/// Set-once latch deciding whether precise geolocation may be requested.
///
/// The transition is monotonic: once granted it never reverts for the rest
/// of the session. IP-based lookups are not gated by this latch.
#[derive(Debug, Default)]
pub struct ConsentGate {
    granted: AtomicBool,
}

impl ConsentGate {
    pub fn new() -> Self {
        Self {
            granted: AtomicBool::new(false),
        }
    }

    /// Record the user's explicit opt-in.
    pub fn grant(&self) {
        self.granted.store(true, Ordering::Release);
    }

    pub fn is_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }
}
