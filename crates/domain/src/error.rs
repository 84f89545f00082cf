/// Shared error type used across all credcache crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An engine-level `set`/`delete` failed part way through a
    /// multi-key write.  Entries already written are left in place.
    #[error("store write failed: {0}")]
    StoreWrite(String),

    /// The identity token payload could not be decoded, or the subject
    /// claim is missing or not a string.
    #[error("malformed claims: {0}")]
    MalformedClaims(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
