//! Session state for one signed-in user.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use curbside_core::{ClientError, read_unverified_claims};

/// Claim holding the identity provider client id.
const CLIENT_ID_CLAIM: &str = "cid";
/// Claim holding the identity provider issuer URL.
const ISSUER_CLAIM: &str = "iss";

/// Where a client stands in the sign-in flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No successful `authenticate` yet.
    Unauthenticated,
    /// Credentials accepted, no authorization token yet.
    SessionEstablished,
    /// Authorization token obtained; queries are allowed.
    Authorized,
}

/// `data` object of the `user/authenticate` response.
#[derive(Deserialize)]
pub(crate) struct AuthenticateResponse {
    data: AuthenticateData,
}

#[derive(Deserialize)]
struct AuthenticateData {
    #[serde(rename = "sessionToken")]
    session_token: String,
    access_token: String,
    refresh_token: String,
    id_token: String,
    #[serde(rename = "id")]
    user_id: String,
    expires_in: i64,
}

/// Credentials of an authenticated user.
///
/// A session is replaced as a whole: `authenticate` builds a new one and
/// `authorize` derives a copy carrying the authorization token.
#[derive(Clone)]
pub struct Session {
    session_token: String,
    access_token: String,
    refresh_token: String,
    id_token: String,
    user_id: String,
    expires_at: DateTime<Utc>,
    client_id: String,
    issuer_url: String,
    authorization_token: Option<String>,
}

impl Session {
    /// Build a session from an authenticate response received at `now`.
    ///
    /// The access token's claims are read without signature verification.
    pub(crate) fn from_response(
        response: AuthenticateResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, ClientError> {
        let data = response.data;

        let claims = read_unverified_claims(&data.access_token)
            .map_err(|err| ClientError::Authentication(err.to_string()))?;
        let client_id = claims
            .require_str(CLIENT_ID_CLAIM)
            .map_err(|err| ClientError::Authentication(err.to_string()))?
            .to_owned();
        let issuer_url = claims
            .require_str(ISSUER_CLAIM)
            .map_err(|err| ClientError::Authentication(err.to_string()))?
            .to_owned();

        let expires_at = Duration::try_seconds(data.expires_in)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| ClientError::Authentication("expires_in out of range".into()))?;

        Ok(Self {
            session_token: data.session_token,
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            id_token: data.id_token,
            user_id: data.user_id,
            expires_at,
            client_id,
            issuer_url,
            authorization_token: None,
        })
    }

    /// Copy of this session carrying `token`.
    #[must_use]
    pub(crate) fn with_authorization(&self, token: String) -> Self {
        Self {
            authorization_token: Some(token),
            ..self.clone()
        }
    }

    /// State this session puts its client in.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.authorization_token.is_some() {
            SessionState::Authorized
        } else {
            SessionState::SessionEstablished
        }
    }

    /// One-time session token exchanged during authorization.
    #[must_use]
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Access token returned by authentication.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Refresh token returned by authentication. Never used by this client.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Identity token returned by authentication.
    #[must_use]
    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    /// Provider user id, sent as `userId`.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// When the access token expires. Tracked, not enforced.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether `expires_at` lies at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Identity provider client id (`cid` claim).
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Identity provider issuer (`iss` claim).
    #[must_use]
    pub fn issuer_url(&self) -> &str {
        &self.issuer_url
    }

    /// Token sent as `oktaToken` once authorized.
    #[must_use]
    pub fn authorization_token(&self) -> Option<&str> {
        self.authorization_token.as_deref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("client_id", &self.client_id)
            .field("issuer_url", &self.issuer_url)
            .field("expires_at", &self.expires_at)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
