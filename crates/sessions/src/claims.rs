//! Identity token claim extraction.
//!
//! The identity token is assumed to have been verified by the upstream
//! authorization flow that produced it.  Only the payload segment is
//! decoded here; the signature is never looked at.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::{Map, Value};

use cc_domain::error::{Error, Result};

/// Decoded claim payload of an identity token.
pub type ClaimSet = Map<String, Value>;

/// base64url that accepts segments with or without `=` padding.
const SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the payload of a compact JWS (`header.payload.signature`)
/// without verifying it.  `None` if the token is not three segments, the
/// payload is not base64url, or it is not a JSON object.
pub fn decode(token: &str) -> Option<ClaimSet> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        tracing::debug!("identity token is not a three-segment JWS");
        return None;
    };

    let bytes = match SEGMENT.decode(payload) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(error = %e, "identity token payload is not base64url");
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Some(claims),
        Ok(_) => {
            tracing::debug!("identity token payload is not a JSON object");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "identity token payload is not JSON");
            None
        }
    }
}

/// Read a non-empty string claim.
pub fn subject_of(claims: &ClaimSet, claim: &str) -> Result<String> {
    match claims.get(claim) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(Error::MalformedClaims(format!("'{claim}' is empty"))),
        Some(_) => Err(Error::MalformedClaims(format!("'{claim}' is not a string"))),
        None => Err(Error::MalformedClaims(format!("missing '{claim}'"))),
    }
}

/// Pulls the subject identifier out of identity tokens.
#[derive(Debug, Clone)]
pub struct ClaimExtractor {
    subject_claim: String,
}

impl Default for ClaimExtractor {
    fn default() -> Self {
        Self::new("sub")
    }
}

impl ClaimExtractor {
    pub fn new(subject_claim: impl Into<String>) -> Self {
        Self {
            subject_claim: subject_claim.into(),
        }
    }

    /// Decode `token` and return its subject.
    pub fn subject(&self, token: &str) -> Result<String> {
        let claims = decode(token)
            .ok_or_else(|| Error::MalformedClaims("identity token payload unreadable".into()))?;
        subject_of(&claims, &self.subject_claim)
    }
}
