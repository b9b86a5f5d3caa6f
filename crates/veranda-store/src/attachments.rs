//! Object-store client for message attachments.

use chrono::Utc;
use reqwest::{Client, StatusCode};
use tracing::debug;
use veranda_types::AttachmentDescriptor;

use crate::config::StoreConfig;
use crate::error::{StoreError, UploadError, UploadErrorKind};

/// Uploads attachment blobs under collision-resistant names and hands back
/// public retrieval URLs.
#[derive(Debug, Clone)]
pub struct AttachmentStoreClient {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl AttachmentStoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            bucket: config.bucket.clone(),
        })
    }

    /// Upload `data` under a fresh storage key.
    ///
    /// 200 or 201 from the store counts as success and yields a descriptor
    /// with the public URL filled in. On failure the error carries the
    /// attempted key so the caller can persist the attachment metadata with
    /// the URL left absent.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> Result<AttachmentDescriptor, UploadError> {
        let key = storage_key(file_name);
        let url = format!("{}/objects/{}/{}", self.base_url, self.bucket, key);

        let resp = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", content_type.to_string())
            .body(data)
            .send()
            .await
            .map_err(|e| UploadError {
                key: key.clone(),
                kind: e.into(),
            })?;

        let status = resp.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError {
                key,
                kind: UploadErrorKind::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        debug!(%key, "attachment stored");
        Ok(AttachmentDescriptor {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            url: Some(self.public_url(&key)),
            storage_key: key,
        })
    }

    /// Public read URL for a stored object.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/objects/public/{}/{}", self.base_url, self.bucket, key)
    }
}

/// Build a storage key from the submission wall clock and the original file
/// name. Microsecond timestamps can repeat for back-to-back uploads, so a
/// random suffix disambiguates within the same tick.
pub fn storage_key(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{}-{:04x}-{}",
        Utc::now().timestamp_micros(),
        rand::random::<u16>(),
        sanitized
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_never_collides() {
        let a = storage_key("photo.png");
        let b = storage_key("photo.png");
        assert_ne!(a, b);
        assert!(a.ends_with("photo.png"));
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let key = storage_key("my photo (1)/!.png");
        let name_part = key.splitn(3, '-').nth(2).unwrap();
        assert_eq!(name_part, "my_photo__1___.png");
    }

    #[test]
    fn many_keys_in_a_tight_loop_stay_distinct() {
        let keys: std::collections::HashSet<String> =
            (0..64).map(|_| storage_key("same.txt")).collect();
        assert_eq!(keys.len(), 64);
    }
}
