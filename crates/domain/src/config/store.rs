use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Credential store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Namespace prepended to every credential key (id, subject and
    /// session-state indices all share it).
    #[serde(default = "d_key_prefix")]
    pub key_prefix: String,

    /// How often expired engine entries are reclaimed.  Expired entries
    /// are unreadable regardless; this only bounds memory.
    #[serde(default = "d_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: d_key_prefix(),
            purge_interval_secs: d_purge_interval_secs(),
        }
    }
}

fn d_key_prefix() -> String {
    "cred_".into()
}

fn d_purge_interval_secs() -> u64 {
    60
}
