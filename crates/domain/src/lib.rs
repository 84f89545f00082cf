//! Shared types for the credcache workspace: the `Credential` record,
//! the common error type, trace events, and configuration.

pub mod config;
pub mod credential;
pub mod error;
pub mod trace;

pub use credential::Credential;
pub use error::{Error, Result};
