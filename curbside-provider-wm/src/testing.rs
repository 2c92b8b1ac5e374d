//! Recording transport and canned provider responses for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;

use curbside_core::{ApiKeys, ClientConfig, HttpRequest, HttpTransport, TransportError};

use crate::client::WmClient;

pub(crate) const ISSUER: &str = "https://sso.example.com/oauth2/default";

pub(crate) const AUTHORIZE_PAGE: &str = r"<html><body><script>
    var data = {};
    data.access_token = 'okta\x2Dtoken\x2D1';
    data.token_type = 'Bearer';
    window.parent.postMessage(data, 'https://www.wm.com');
</script></body></html>";

type Reply = Result<String, u16>;

/// Answers requests by URL suffix and keeps every request it saw.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<Vec<(String, Reply)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, url_suffix: &str, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .push((url_suffix.to_owned(), Ok(body.to_owned())));
    }

    pub(crate) fn fail(&self, url_suffix: &str, status: u16) {
        self.routes
            .lock()
            .unwrap()
            .push((url_suffix.to_owned(), Err(status)));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<String, TransportError> {
        let reply = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(suffix, _reply)| request.url.ends_with(suffix.as_str()))
            .map(|(_suffix, reply)| reply.clone());
        self.requests.lock().unwrap().push(request);

        match reply {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(TransportError::Status {
                status,
                body: "rejected".to_owned(),
            }),
            None => Err(TransportError::Status {
                status: 404,
                body: "no route".to_owned(),
            }),
        }
    }
}

pub(crate) fn config() -> ClientConfig {
    ClientConfig::new(ApiKeys {
        authentication: "key-auth".to_owned(),
        accounts: "key-accounts".to_owned(),
        services: "key-services".to_owned(),
        holidays: "key-holidays".to_owned(),
    })
    .with_base_url("https://api.example.com")
}

/// Unsigned JWT carrying the identity provider claims.
pub(crate) fn jwt(client_id: &str, issuer: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "RS256", "kid": "k"}).to_string());
    let claims = URL_SAFE_NO_PAD.encode(
        json!({"ver": 1, "cid": client_id, "iss": issuer, "uid": "00u1"}).to_string(),
    );
    format!("{header}.{claims}.c2lnbmF0dXJl")
}

pub(crate) fn authenticate_body(access_token: &str) -> String {
    json!({
        "data": {
            "sessionToken": "session-token",
            "access_token": access_token,
            "refresh_token": "refresh-token",
            "id_token": "id-token",
            "id": "00u1",
            "expires_in": 3600,
        }
    })
    .to_string()
}

/// Client that went through both sign-in hops against `transport`.
pub(crate) async fn authorized_client(transport: &Arc<FakeTransport>) -> WmClient {
    transport.respond("user/authenticate", &authenticate_body(&jwt("client-1", ISSUER)));
    transport.respond("v1/authorize", AUTHORIZE_PAGE);

    let mut client =
        WmClient::with_transport(config(), Arc::clone(transport) as Arc<dyn HttpTransport>);
    client.authenticate("me@example.com", "pw").await.unwrap();
    client.authorize().await.unwrap();
    client
}
