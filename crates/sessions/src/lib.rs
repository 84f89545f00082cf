//! Session lifecycle for credcache.
//!
//! Turns an IdP token exchange into a cached [`cc_domain::Credential`],
//! answers "is this session still active?" by credential id, and drops
//! credentials when the IdP reports that the underlying session ended.

pub mod claims;
pub mod controller;
pub mod event;
pub mod subject_lock;

pub use claims::ClaimExtractor;
pub use controller::{NewSession, SessionController, SessionStatus};
pub use event::LifecycleEvent;
pub use subject_lock::SubjectLockMap;
