use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the session handle is read from, and how the subject is taken
/// out of the identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Cookie carrying the credential id on validate requests.
    #[serde(default = "d_session_id")]
    pub cookie_name: String,

    /// Urlencoded form field consulted when the cookie is absent.
    #[serde(default = "d_session_id")]
    pub form_field: String,

    /// Identity token claim holding the subject identifier.
    #[serde(default = "d_subject_claim")]
    pub subject_claim: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            cookie_name: d_session_id(),
            form_field: d_session_id(),
            subject_claim: d_subject_claim(),
        }
    }
}

fn d_session_id() -> String {
    "session_id".into()
}

fn d_subject_claim() -> String {
    "sub".into()
}
