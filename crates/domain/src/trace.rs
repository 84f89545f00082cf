use serde::Serialize;

/// Structured trace events emitted across all credcache crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    CredentialCreated {
        credential_id: String,
        subject_id: String,
        expires_in: u64,
        has_session_state: bool,
    },
    CredentialReused {
        credential_id: String,
        subject_id: String,
    },
    SessionValidated {
        credential_id: String,
        active: bool,
    },
    CredentialInvalidated {
        credential_id: String,
        subject_id: String,
        session_state: String,
    },
    LifecycleEventReceived {
        resource_type: String,
        operation_type: String,
        resource_path: String,
        accepted: bool,
    },
    ExpiredEntriesPurged {
        purged: usize,
        remaining: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cc_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::SessionValidated {
            credential_id: "c-1".into(),
            active: true,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "SessionValidated");
        assert_eq!(json["credential_id"], "c-1");
        assert_eq!(json["active"], true);
    }
}
