//! The locally rendered copy of the message log.

use std::collections::HashSet;

use uuid::Uuid;
use veranda_types::Message;

/// Delivery state of a locally visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Present in the last store listing.
    Synced,
    /// Appended locally, waiting for the next refresh to echo it back.
    Pending,
    /// The append was rejected; shown with a failed badge.
    Failed,
}

/// One renderable row.
#[derive(Debug, Clone)]
pub struct ViewEntry {
    pub message: Message,
    pub delivery: Delivery,
}

/// Local, non-authoritative copy of the log.
///
/// The synced portion is replaced wholesale on every successful refresh,
/// never patched in place, so local order cannot drift from the store's.
/// Optimistic entries ride along after it, keyed by the client-assigned
/// message id, until the store echoes that id back.
#[derive(Debug, Default)]
pub struct LocalView {
    synced: Vec<Message>,
    local: Vec<ViewEntry>,
}

impl LocalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a fresh listing and drop any optimistic entry the store now
    /// returns.
    pub fn replace(&mut self, messages: Vec<Message>) {
        let synced_ids: HashSet<Uuid> = messages.iter().map(|m| m.id).collect();
        self.synced = messages;
        self.local.retain(|entry| !synced_ids.contains(&entry.message.id));
    }

    /// Add an optimistic entry for a just-submitted message.
    pub fn push_local(&mut self, message: Message, delivery: Delivery) {
        self.local.push(ViewEntry { message, delivery });
    }

    /// Store order first, then local entries in submission order.
    pub fn entries(&self) -> Vec<ViewEntry> {
        self.synced
            .iter()
            .map(|m| ViewEntry {
                message: m.clone(),
                delivery: Delivery::Synced,
            })
            .chain(self.local.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.synced.len() + self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
