//! Transport port and the errors surfaced by the client.

use std::fmt;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Value as JsonValue;

#[derive(thiserror::Error, Debug)]
/// Errors raised by an [`HttpTransport`].
pub enum TransportError {
    /// Network layer failed or timed out.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body as text.
        body: String,
    },
}

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the provider.
pub enum ClientError {
    /// Credentials were rejected or the access token had an unexpected shape.
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// The identity provider handshake failed or its response could not be read.
    #[error("Authorization failed: {0}")]
    Authorization(String),
    /// A query was issued before the session reached the authorized state.
    #[error("Not authorized: call authenticate and authorize first")]
    NotAuthorized,
    /// A data endpoint request failed, including rejected or expired tokens.
    #[error("API request failed: {0}")]
    ApiRequest(#[from] TransportError),
    /// A data endpoint answered with a payload of the wrong shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// HTTP verbs the client needs.
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        };
        write!(formatter, "{verb}")
    }
}

#[derive(Debug, Clone)]
/// Fully described outgoing request.
pub struct HttpRequest {
    /// Verb to use.
    pub method: HttpMethod,
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Request headers, in order.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<JsonValue>,
}

impl HttpRequest {
    /// Start a `GET` request.
    #[must_use]
    pub fn get<U: Into<String>>(url: U) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Start a `POST` request.
    #[must_use]
    pub fn post<U: Into<String>>(url: U) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    fn new<U: Into<String>>(method: HttpMethod, url: U) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a header.
    #[must_use]
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up the first header with the given name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _value)| key.eq_ignore_ascii_case(name))
            .map(|(_key, value)| value.as_str())
    }

    /// Look up the first query parameter with the given name.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _value)| key == name)
            .map(|(_key, value)| value.as_str())
    }
}

#[async_trait]
/// Capability to perform a request and hand back the body of a 2xx response.
pub trait HttpTransport: Send + Sync {
    /// Perform `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] for non-2xx responses and
    /// [`TransportError::Network`] when the request could not complete.
    async fn send(&self, request: HttpRequest) -> Result<String, TransportError>;
}
