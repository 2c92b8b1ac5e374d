//! Provider for the Waste Management customer REST API.
//!
//! Sign-in is a two-hop flow: [`WmClient::authenticate`] posts credentials and receives a
//! session token plus an access token, then [`WmClient::authorize`] trades the session token
//! at the identity provider for the token every data query is signed with.

mod api;
/// Blocking wrapper over the async client.
pub mod blocking;
/// Async client: session manager and data queries.
pub mod client;
mod handshake;
/// Session credentials and sign-in state.
pub mod session;
/// reqwest-backed transport.
pub mod transport;

#[cfg(test)]
mod testing;

pub use blocking::BlockingWmClient;
pub use client::WmClient;
pub use session::{Session, SessionState};
pub use transport::ReqwestTransport;
