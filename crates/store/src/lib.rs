//! Credential storage for credcache.
//!
//! [`engine`] is the TTL-aware key/value leaf; [`credentials`] layers the
//! three credential indices (by id, by subject, by session state) on top
//! of it.

pub mod credentials;
pub mod engine;

pub use credentials::CredentialStore;
pub use engine::{KvEngine, MemoryEngine};
