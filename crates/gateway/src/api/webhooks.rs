//! IdP lifecycle webhook: `POST /ac/webhook/keycloak/event`.
//!
//! Every accepted delivery is answered `200 {"status":"ok"}` straight
//! away, whether or not the event matches, parses, or leads to a
//! successful invalidation.  The only rejection is a bad signature when
//! `webhook.secret_env` is configured.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use cc_sessions::LifecycleEvent;

use super::error::api_error;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-keycloak-signature";

/// Hex HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signature_matches(
    secret: &[u8],
    headers: &HeaderMap,
    body: &[u8],
) -> Result<bool, InvalidLength> {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let provided = provided.strip_prefix("sha256=").unwrap_or(provided);
    let computed = sign(secret, body)?;
    Ok(bool::from(computed.as_bytes().ct_eq(provided.to_ascii_lowercase().as_bytes())))
}

pub async fn lifecycle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    tracing::info!("received event webhook");

    if let Some(secret) = &state.webhook_secret {
        match signature_matches(secret, &headers, &body) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("lifecycle event with invalid signature");
                return api_error(StatusCode::UNAUTHORIZED, "invalid webhook signature");
            }
            Err(e) => {
                tracing::error!(error = %e, "webhook secret unusable as HMAC key");
                return api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
            }
        }
    }

    match serde_json::from_slice::<LifecycleEvent>(&body) {
        Ok(event) => {
            tracing::info!(
                event_id = %event.id,
                realm = %event.realm_id,
                resource_type = %event.resource_type,
                operation_type = %event.operation_type,
                resource_path = %event.resource_path,
                "lifecycle event"
            );
            // Invalidation runs detached; the acknowledgement does not wait.
            if state.sessions.on_lifecycle_event(&event).is_none() {
                tracing::debug!("event does not end a session, ignored");
            }
        }
        Err(e) => tracing::warn!(error = %e, "unparsable lifecycle event"),
    }

    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}
