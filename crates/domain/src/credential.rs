use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached session credential.
///
/// Every field is fixed at creation.  The record is stored under three
/// keys (id, subject, session state) that all share `expires_in` as
/// their TTL, so a credential is never refreshed in place: once the TTL
/// runs out the whole record disappears from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque session handle handed back to the client (cookie value).
    pub id: String,
    /// IdP correlator used to match session-termination events.
    #[serde(default)]
    pub session_state: Option<String>,
    pub access_token: String,
    /// Principal identifier taken from the identity token's subject claim.
    #[serde(rename = "user_id")]
    pub subject_id: String,
    #[serde(rename = "create_date")]
    pub created_at: DateTime<Utc>,
    /// Lifetime in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl Credential {
    /// Mint a new credential with a fresh id and the current time.
    pub fn new(
        subject_id: impl Into<String>,
        access_token: impl Into<String>,
        expires_in: u64,
        session_state: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_state: session_state.filter(|s| !s.is_empty()),
            access_token: access_token.into(),
            subject_id: subject_id.into(),
            created_at: Utc::now(),
            expires_in,
            tenant_id: None,
        }
    }

    /// The session state, if present and non-empty.
    pub fn session_state(&self) -> Option<&str> {
        self.session_state.as_deref().filter(|s| !s.is_empty())
    }

    /// Time-to-live applied to every index entry of this credential.
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.expires_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_distinct_ids() {
        let a = Credential::new("user123", "at", 60, None);
        let b = Credential::new("user123", "at", 60, None);
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn empty_session_state_is_dropped() {
        let cred = Credential::new("user123", "at", 60, Some(String::new()));
        assert!(cred.session_state.is_none());
        assert!(cred.session_state().is_none());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let cred = Credential::new("user123", "at-1", 3600, Some("ss-1".into()));
        let json = serde_json::to_value(&cred).unwrap();
        assert_eq!(json["user_id"], "user123");
        assert_eq!(json["access_token"], "at-1");
        assert_eq!(json["session_state"], "ss-1");
        assert_eq!(json["expires_in"], 3600);
        assert!(json["create_date"].is_string());
        assert!(json["tenant_id"].is_null());
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let raw = r#"{
            "id": "c-1",
            "access_token": "at",
            "user_id": "user123",
            "create_date": "2026-01-15T10:00:00Z",
            "expires_in": 60
        }"#;
        let cred: Credential = serde_json::from_str(raw).unwrap();
        assert_eq!(cred.id, "c-1");
        assert_eq!(cred.subject_id, "user123");
        assert!(cred.session_state.is_none());
        assert_eq!(cred.ttl(), std::time::Duration::from_secs(60));
    }
}
