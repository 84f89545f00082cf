//! Session lifecycle: create, validate, invalidate.
//!
//! Per subject a credential is `Absent → Live → (Invalidated | Expired)`,
//! and both terminal states read back as absent.  Expiry is entirely the
//! engine's business; this controller only ever deletes on invalidation.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use cc_domain::config::WebhookConfig;
use cc_domain::error::{Error, Result};
use cc_domain::trace::TraceEvent;
use cc_domain::Credential;
use cc_store::CredentialStore;

use crate::event::LifecycleEvent;
use crate::subject_lock::SubjectLockMap;

/// Inputs for [`SessionController::create`].  The subject has already
/// been pulled out of the identity token.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub subject_id: String,
    pub access_token: String,
    pub expires_in: u64,
    pub session_state: Option<String>,
}

/// Result of a validate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub active: bool,
    pub credential: Option<Credential>,
}

impl SessionStatus {
    fn from_lookup(credential: Option<Credential>) -> Self {
        Self {
            active: credential.is_some(),
            credential,
        }
    }
}

pub struct SessionController {
    store: Arc<CredentialStore>,
    locks: SubjectLockMap,
    webhook: WebhookConfig,
}

impl SessionController {
    pub fn new(store: Arc<CredentialStore>, webhook: WebhookConfig) -> Self {
        Self {
            store,
            locks: SubjectLockMap::new(),
            webhook,
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn locks(&self) -> &SubjectLockMap {
        &self.locks
    }

    /// Return the subject's live credential, or mint and save a new one.
    ///
    /// An existing credential comes back untouched: neither its fields nor
    /// its TTL are refreshed.  Creates for one subject run one at a time.
    pub async fn create(&self, req: NewSession) -> Result<Credential> {
        if req.expires_in == 0 {
            return Err(Error::BadRequest("expires_in must be greater than 0".into()));
        }

        let _permit = self.locks.acquire(&req.subject_id).await?;

        if self.store.exists_by_subject(&req.subject_id) {
            if let Some(existing) = self.store.get_by_subject(&req.subject_id) {
                tracing::info!(subject_id = %req.subject_id, "credential already exists");
                TraceEvent::CredentialReused {
                    credential_id: existing.id.clone(),
                    subject_id: existing.subject_id.clone(),
                }
                .emit();
                return Ok(existing);
            }
            // Subject entry outlived (or never got) its id entry; replace it.
            tracing::warn!(
                subject_id = %req.subject_id,
                "subject index points at a missing credential, minting a new one"
            );
        }

        let cred = Credential::new(
            req.subject_id,
            req.access_token,
            req.expires_in,
            req.session_state,
        );
        self.store.save(&cred)?;

        tracing::info!(subject_id = %cred.subject_id, credential_id = %cred.id, "saved credential");
        TraceEvent::CredentialCreated {
            credential_id: cred.id.clone(),
            subject_id: cred.subject_id.clone(),
            expires_in: cred.expires_in,
            has_session_state: cred.session_state().is_some(),
        }
        .emit();

        Ok(cred)
    }

    /// Look a session up by credential id.  A miss is `active: false`, not
    /// an error.
    pub fn validate(&self, credential_id: &str) -> SessionStatus {
        let status = SessionStatus::from_lookup(self.store.get_by_id(credential_id));
        match &status.credential {
            Some(cred) => tracing::debug!(subject_id = %cred.subject_id, "credential found"),
            None => tracing::debug!(credential_id, "credential not found"),
        }
        TraceEvent::SessionValidated {
            credential_id: credential_id.to_owned(),
            active: status.active,
        }
        .emit();
        status
    }

    /// Drop the credential bound to `session_state` from every index.
    ///
    /// A miss is reported as [`Error::CredentialNotFound`] and changes
    /// nothing.
    pub fn invalidate(&self, session_state: &str) -> Result<Credential> {
        let Some(cred) = self.store.get_by_session_state(session_state) else {
            tracing::info!(session_state, "credential not found for session state");
            return Err(Error::CredentialNotFound(session_state.to_owned()));
        };

        self.store.delete(&cred)?;

        TraceEvent::CredentialInvalidated {
            credential_id: cred.id.clone(),
            subject_id: cred.subject_id.clone(),
            session_state: session_state.to_owned(),
        }
        .emit();
        Ok(cred)
    }

    /// Filter an IdP event and, if it ends a session, invalidate that
    /// session on a background task.
    ///
    /// Returns the task handle so callers that care (tests) can wait on
    /// it; the webhook itself never does.  Failures are logged on the
    /// task and go no further.
    pub fn on_lifecycle_event(
        self: &Arc<Self>,
        event: &LifecycleEvent,
    ) -> Option<JoinHandle<Result<Credential>>> {
        let session_state = event.ended_session_state(&self.webhook);

        TraceEvent::LifecycleEventReceived {
            resource_type: event.resource_type.clone(),
            operation_type: event.operation_type.clone(),
            resource_path: event.resource_path.clone(),
            accepted: session_state.is_some(),
        }
        .emit();

        let session_state = session_state?;
        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            let result = this.invalidate(&session_state);
            if let Err(e) = &result {
                tracing::warn!(error = %e, session_state = %session_state, "session invalidation failed");
            }
            result
        }))
    }
}
