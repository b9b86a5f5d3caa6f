//! The orchestrating sync loop: periodic refresh from the store, plus the
//! submission path (validate, acquire geo, upload, append, optimistic
//! local entry).

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use veranda_geo::{DEFAULT_LOOKUP_TIMEOUT, GeoBridge, ProviderSpec};
use veranda_store::{AttachmentStoreClient, LogStoreClient, StoreError, UploadError};
use veranda_types::{AttachmentDescriptor, AttachmentUpload, Message, MessageDraft, ValidationError};

use crate::session::Session;
use crate::view::{Delivery, LocalView};
use crate::visit::VisitRecorder;

/// Default refresh cadence.
pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

/// Where the session is in its lifecycle. `Active` is the terminal steady
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingConsent,
    Active,
}

/// What happened to a valid submission.
///
/// Store failures ride back inside the outcome instead of failing the
/// call: the message is already in the local view with a pending or failed
/// badge, and must not be dropped.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub message_id: Uuid,
    pub delivery: Delivery,
    /// Set when the append was rejected; surface this to the submitter.
    pub append_error: Option<StoreError>,
    /// Set when the attachment upload failed; the attachment metadata was
    /// kept on the message with its URL absent.
    pub upload_error: Option<UploadError>,
}

pub struct SyncEngine<B: GeoBridge> {
    log_store: LogStoreClient,
    attachments: AttachmentStoreClient,
    providers: Vec<ProviderSpec>,
    bridge: B,
    session: Session,
    visit: VisitRecorder,
    view: LocalView,
    phase: Phase,
    precise_timeout: Duration,
}

impl<B: GeoBridge> SyncEngine<B> {
    pub fn new(
        log_store: LogStoreClient,
        attachments: AttachmentStoreClient,
        providers: Vec<ProviderSpec>,
        bridge: B,
    ) -> Self {
        let visit = VisitRecorder::new(providers.clone(), DEFAULT_LOOKUP_TIMEOUT);
        Self {
            log_store,
            attachments,
            providers,
            bridge,
            session: Session::new(),
            visit,
            view: LocalView::new(),
            phase: Phase::AwaitingConsent,
            precise_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> &LocalView {
        &self.view
    }

    /// Record the once-per-session visit event. Called on first render;
    /// safe to call again, the recorder no-ops after the first time.
    pub async fn record_visit(&self) {
        self.visit
            .record_once(&self.session, &self.log_store, &self.bridge)
            .await;
    }

    /// The user's explicit opt-in: opens the consent gate and moves the
    /// session into its steady state, refreshing the view immediately.
    pub async fn grant_consent(&mut self) {
        self.session.consent.grant();
        if self.phase == Phase::AwaitingConsent {
            self.phase = Phase::Active;
            info!(session = %self.session.id, "session active");
            self.tick().await;
        }
    }

    /// One refresh: fetch the store's listing and replace the local view
    /// wholesale. A failed fetch leaves the view untouched; the next
    /// scheduled tick retries naturally, so there is no retry storm here.
    pub async fn tick(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        match self.log_store.list_messages().await {
            Ok(messages) => self.view.replace(messages),
            Err(e) => warn!("refresh failed, keeping previous view: {e}"),
        }
    }

    /// Validate and submit one draft.
    ///
    /// Invalid drafts are rejected before any network I/O. Valid ones run
    /// geo acquisition, the optional attachment upload, the store append,
    /// and the optimistic local entry in that order; upload and append
    /// failures are downgraded into the outcome rather than aborting the
    /// submission.
    pub async fn submit(&mut self, draft: MessageDraft) -> Result<SubmitOutcome, ValidationError> {
        draft.validate()?;

        let geo = veranda_geo::acquire(
            &self.providers,
            &self.bridge,
            self.session.consent.is_granted(),
            self.precise_timeout,
        )
        .await;

        let mut upload_error = None;
        let attachment = match draft.attachment {
            Some(AttachmentUpload {
                file_name,
                content_type,
                data,
            }) => {
                match self
                    .attachments
                    .upload(data, &file_name, &content_type)
                    .await
                {
                    Ok(descriptor) => Some(descriptor),
                    Err(e) => {
                        warn!(file = %file_name, "attachment upload failed: {e}");
                        let descriptor = AttachmentDescriptor {
                            file_name,
                            content_type,
                            storage_key: e.key.clone(),
                            url: None,
                        };
                        upload_error = Some(e);
                        Some(descriptor)
                    }
                }
            }
            None => None,
        };

        let message = Message {
            id: Uuid::new_v4(),
            author: draft.author.trim().to_string(),
            body: draft.body,
            attachment,
            geo,
            created_at: Utc::now(),
        };

        let (delivery, append_error) = match self.log_store.append_message(&message).await {
            Ok(()) => (Delivery::Pending, None),
            Err(e) => {
                warn!(message = %message.id, "append failed: {e}");
                (Delivery::Failed, Some(e))
            }
        };

        let message_id = message.id;
        self.view.push_local(message, delivery);

        Ok(SubmitOutcome {
            message_id,
            delivery,
            append_error,
            upload_error,
        })
    }
}
