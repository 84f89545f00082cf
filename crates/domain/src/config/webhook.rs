use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IdP lifecycle webhook
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which IdP admin events end a session, and how the session state is
/// recovered from the event's resource path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "d_resource_type")]
    pub resource_type: String,

    #[serde(default = "d_operation_type")]
    pub operation_type: String,

    /// Stripped from `resourcePath` to obtain the session state
    /// (`sessions/<state>` → `<state>`).
    #[serde(default = "d_path_prefix")]
    pub path_prefix: String,

    /// Environment variable holding an HMAC-SHA256 secret.  When the
    /// variable is set and non-empty, events must carry a valid
    /// `X-Keycloak-Signature` header.  Unset = signatures not checked.
    #[serde(default)]
    pub secret_env: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            resource_type: d_resource_type(),
            operation_type: d_operation_type(),
            path_prefix: d_path_prefix(),
            secret_env: None,
        }
    }
}

fn d_resource_type() -> String {
    "USER_SESSION".into()
}

fn d_operation_type() -> String {
    "DELETE".into()
}

fn d_path_prefix() -> String {
    "sessions/".into()
}
