pub mod error;
pub mod health;
pub mod sessions;
pub mod webhooks;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Session lifecycle
        .route("/ac/session/create", post(sessions::create_session))
        .route("/ac/session/validate", post(sessions::validate_session))
        // IdP admin events
        .route("/ac/webhook/keycloak/event", post(webhooks::lifecycle_event))
        // Liveness
        .route("/healthz", get(health::healthz))
}
