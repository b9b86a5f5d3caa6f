use thiserror::Error;

/// Failure talking to the log store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The store's response did not decode as the expected shape.
    #[error("store response did not decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure uploading an attachment object.
///
/// Carries the storage key that was attempted so the caller can keep the
/// attachment metadata on the message even though the object is absent.
#[derive(Debug, Error)]
#[error("upload of {key} failed: {kind}")]
pub struct UploadError {
    pub key: String,
    #[source]
    pub kind: UploadErrorKind,
}

#[derive(Debug, Error)]
pub enum UploadErrorKind {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}
