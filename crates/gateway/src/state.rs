use std::sync::Arc;

use cc_domain::config::Config;
use cc_sessions::{ClaimExtractor, SessionController};

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Create / validate / invalidate over the shared credential store.
    pub sessions: Arc<SessionController>,
    pub claims: Arc<ClaimExtractor>,
    /// HMAC key for lifecycle webhook signatures (read once at startup).
    /// `None` = signatures are not checked.
    pub webhook_secret: Option<Arc<[u8]>>,
}
