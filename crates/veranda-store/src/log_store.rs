//! Client for the remote append-only message and visit tables.

use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use veranda_types::{Message, VisitEvent};

use crate::config::StoreConfig;
use crate::error::StoreError;

/// REST client for the authoritative message log.
///
/// `list_messages` delegates ordering entirely to the store
/// (`order=created_at.asc`); no local sort is applied, so store-side clock
/// skew and insertion races surface as-is. Appends are single inserts with
/// no read-after-write verification.
#[derive(Debug, Clone)]
pub struct LogStoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LogStoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Append one message. Fire-and-forget once this returns `Ok`: the
    /// caller gets no confirmation beyond the store's status code.
    pub async fn append_message(&self, message: &Message) -> Result<(), StoreError> {
        self.append("messages", message).await
    }

    /// Append one visit event to the visit table.
    pub async fn append_visit(&self, visit: &VisitEvent) -> Result<(), StoreError> {
        self.append("visits", visit).await
    }

    /// Fetch the full log, ordered by creation time ascending by the store.
    pub async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        let url = format!("{}/messages?order=created_at.asc", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let messages: Vec<Message> = serde_json::from_str(&body)?;
        debug!(count = messages.len(), "listed messages");
        Ok(messages)
    }

    async fn append<T: Serialize>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.base_url, table);
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(row)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(body),
            });
        }
        debug!(table, "row appended");
        Ok(())
    }
}

/// First 200 chars of a response body, for error messages.
fn truncate(mut body: String) -> String {
    if let Some((i, _)) = body.char_indices().nth(200) {
        body.truncate(i);
    }
    body
}
