//! IdP admin events delivered to the lifecycle webhook.

use serde::{Deserialize, Serialize};

use cc_domain::config::WebhookConfig;

/// An admin event as posted by the IdP's event listener.  Only the
/// resource type, operation type and path are acted on; the rest is kept
/// for logging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecycleEvent {
    pub id: String,
    pub time: i64,
    pub realm_id: String,
    pub resource_path: String,
    pub error: String,
    pub resource_type: String,
    pub operation_type: String,
}

impl LifecycleEvent {
    /// Whether this event reports a terminated session.
    pub fn is_session_end(&self, cfg: &WebhookConfig) -> bool {
        self.resource_type == cfg.resource_type && self.operation_type == cfg.operation_type
    }

    /// The session state this event ends, or `None` when the event is not
    /// a session end or carries no usable path.
    ///
    /// The configured prefix is stripped from `resourcePath`; a path that
    /// does not start with it is taken verbatim.
    pub fn ended_session_state(&self, cfg: &WebhookConfig) -> Option<String> {
        if !self.is_session_end(cfg) {
            return None;
        }
        let path = self.resource_path.as_str();
        let state = path.strip_prefix(cfg.path_prefix.as_str()).unwrap_or(path);
        (!state.is_empty()).then(|| state.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(resource_type: &str, operation_type: &str, path: &str) -> LifecycleEvent {
        LifecycleEvent {
            resource_type: resource_type.into(),
            operation_type: operation_type.into(),
            resource_path: path.into(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_keycloak_admin_event() {
        let raw = r#"{
            "id": "e-1",
            "time": 1700000000000,
            "realmId": "demo",
            "resourcePath": "sessions/ss-1",
            "resourceType": "USER_SESSION",
            "operationType": "DELETE",
            "authDetails": { "userId": "admin" }
        }"#;
        let ev: LifecycleEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(ev.realm_id, "demo");
        assert!(ev.error.is_empty());
        assert_eq!(
            ev.ended_session_state(&WebhookConfig::default()).as_deref(),
            Some("ss-1")
        );
    }

    #[test]
    fn other_resource_or_operation_is_ignored() {
        let cfg = WebhookConfig::default();
        assert!(event("USER", "DELETE", "sessions/ss-1").ended_session_state(&cfg).is_none());
        assert!(event("USER_SESSION", "CREATE", "sessions/ss-1").ended_session_state(&cfg).is_none());
        assert!(event("", "", "").ended_session_state(&cfg).is_none());
    }

    #[test]
    fn unprefixed_path_is_used_verbatim() {
        let cfg = WebhookConfig::default();
        let ev = event("USER_SESSION", "DELETE", "ss-2");
        assert_eq!(ev.ended_session_state(&cfg).as_deref(), Some("ss-2"));
    }

    #[test]
    fn bare_prefix_yields_nothing() {
        let cfg = WebhookConfig::default();
        assert!(event("USER_SESSION", "DELETE", "sessions/").ended_session_state(&cfg).is_none());
    }
}
