use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoRecord;

/// A single entry in the shared message log.
///
/// Messages are immutable once appended. The remote store owns the durable
/// copy and its `created_at` ordering is authoritative; local copies are
/// transient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Client-assigned at submission and echoed back by the store. Doubles
    /// as the de-duplication key for optimistic local entries.
    pub id: Uuid,
    pub author: String,
    /// May be empty when an attachment is present.
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentDescriptor>,
    /// IP-derived and (when consented) browser-derived location data.
    pub geo: GeoRecord,
    pub created_at: DateTime<Utc>,
}

/// Attachment metadata embedded in a message.
///
/// `url` is present only after a successful upload. A failed upload keeps
/// the rest of the metadata so the message still records what was attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub file_name: String,
    pub content_type: String,
    pub storage_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One per-session page-visit event, written once to the visit table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitEvent {
    pub session_id: Uuid,
    pub geo: GeoRecord,
    pub created_at: DateTime<Utc>,
}

/// A not-yet-submitted message as entered at the boundary.
#[derive(Debug, Clone, Default)]
pub struct MessageDraft {
    pub author: String,
    pub body: String,
    pub attachment: Option<AttachmentUpload>,
}

/// Raw attachment bytes staged for upload.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Rejected before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("author name must not be empty")]
    EmptyAuthor,
    #[error("message needs a body or an attachment")]
    EmptySubmission,
}

impl MessageDraft {
    /// A draft is sendable with a non-empty author and either body text or
    /// an attachment.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.author.trim().is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if self.body.trim().is_empty() && self.attachment.is_none() {
            return Err(ValidationError::EmptySubmission);
        }
        Ok(())
    }
}
