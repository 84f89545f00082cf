//! Session create / validate endpoints.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use cc_domain::error::Error;
use cc_sessions::NewSession;

use super::error::{api_error, ApiError};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /ac/session/create
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The IdP token endpoint response, passed through by the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenBody {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
    pub refresh_token: String,
    pub refresh_token_expires_in: u64,
    pub id_token: String,
    pub session_state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    pub token: TokenBody,
    /// Takes precedence over `token.session_state`.
    #[serde(default)]
    pub session_state: Option<String>,
}

/// Return the caller's live credential, or mint one from the token pair.
///
/// The identity token is decoded without verification; whoever calls
/// this endpoint has already completed the authorization flow.
pub async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable create request");
            return Ok(api_error(StatusCode::BAD_REQUEST, "invalid request body"));
        }
    };

    if body.token.id_token.is_empty() {
        return Err(Error::BadRequest("token.id_token is required".into()).into());
    }

    let subject_id = state.claims.subject(&body.token.id_token)?;
    let session_state = body
        .session_state
        .filter(|s| !s.is_empty())
        .or(body.token.session_state);

    let credential = state
        .sessions
        .create(NewSession {
            subject_id,
            access_token: body.token.access_token,
            expires_in: body.token.expires_in,
            session_state,
        })
        .await?;

    Ok(Json(serde_json::json!({ "credential": credential })).into_response())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /ac/session/validate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Find `name` in the request's `Cookie` headers.  Empty values count as
/// absent.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Report whether the session named by the cookie (or, failing that, the
/// urlencoded form field) is still active.
pub async fn validate_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Option<Form<HashMap<String, String>>>,
) -> Response {
    let cfg = &state.config.sessions;

    let id = match cookie_value(&headers, &cfg.cookie_name) {
        Some(id) => id,
        None => {
            tracing::debug!("no session id cookie");
            let from_form = form
                .and_then(|Form(mut fields)| fields.remove(&cfg.form_field))
                .filter(|v| !v.is_empty());
            match from_form {
                Some(id) => {
                    tracing::debug!(session_id = %id, "session id taken from form");
                    id
                }
                None => return api_error(StatusCode::BAD_REQUEST, "session id not found"),
            }
        }
    };

    Json(state.sessions.validate(&id)).into_response()
}
