//! Claims access for the provider's bearer tokens.
//!
//! The provider hands out signed JWT access tokens whose claims carry the identity
//! provider coordinates (`cid`, `iss`). The client only needs to *read* those claims;
//! the signature is intentionally **not** verified. The token arrives over TLS from the
//! provider itself; the transport is the trust boundary.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value as JsonValue;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Malformed token: {0}")]
/// The token is not a readable JWT.
pub struct TokenError(String);

/// Claims read from a token whose signature was not checked.
#[derive(Debug, Clone)]
pub struct UnverifiedClaims {
    inner: JsonValue,
}

impl UnverifiedClaims {
    /// Gets a claim value by key.
    #[must_use]
    pub fn get_claim(&self, key: &str) -> Option<&JsonValue> {
        self.inner.get(key)
    }

    /// Gets a string claim.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the claim is absent or not a string.
    pub fn require_str(&self, key: &str) -> Result<&str, TokenError> {
        self.get_claim(key)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| TokenError(format!("missing claim: {key}")))
    }

    /// Gets the inner JSON value.
    #[must_use]
    pub fn as_json(&self) -> &JsonValue {
        &self.inner
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// # Errors
///
/// Returns [`TokenError`] if the token does not have three dot-separated segments,
/// the payload is not base64url, or it does not hold a JSON object.
pub fn read_unverified_claims(token: &str) -> Result<UnverifiedClaims, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError("expected three segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| TokenError(format!("payload is not base64url: {err}")))?;

    let inner: JsonValue = serde_json::from_slice(&bytes)
        .map_err(|err| TokenError(format!("payload is not JSON: {err}")))?;

    if !inner.is_object() {
        return Err(TokenError("payload is not a JSON object".into()));
    }

    Ok(UnverifiedClaims { inner })
}
