//! Client for the provider REST API: sign-in flow and data queries.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::json;

use curbside_core::{
    Account, AccountId, ClientConfig, ClientError, EndpointCategory, HolidayImpact, HttpMethod,
    HttpRequest, HttpTransport, PickupSchedule, Service, ServiceId, TransportError,
    parse_impacted_dates, signals_holiday,
};

use crate::api::{
    AccountsResponse, HolidaysResponse, PickupInfoResponse, ServicesResponse, parse_pickup_date,
};
use crate::handshake::extract_authorization_token;
use crate::session::{AuthenticateResponse, Session, SessionState};
use crate::transport::ReqwestTransport;

const AUTHENTICATE_PATH: &str = "user/authenticate";

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";
const API_KEY_HEADER: &str = "apiKey";
const AUTHORIZATION_HEADER: &str = "oktaToken";

// Fixed parameters of the implicit-grant request the provider's web app makes.
const AUTHORIZE_NONCE: &str = "x";
const AUTHORIZE_STATE: &str = "x";
const AUTHORIZE_SCOPE: &str = "openid email offline_access";
const AUTHORIZE_REDIRECT_URI: &str = "https://www.wm.com";
const AUTHORIZE_RESPONSE_MODE: &str = "okta_post_message";

/// Signed-in client for one user.
///
/// `authenticate` and `authorize` take `&mut self`; queries take `&self` and may run
/// concurrently with each other.
pub struct WmClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    session: Option<Session>,
}

impl WmClient {
    /// Create a client backed by a reqwest transport honoring the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            session: None,
        }
    }

    /// Where the client stands in the sign-in flow.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Unauthenticated, Session::state)
    }

    /// Current session, if authenticated.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Sign in with email and password.
    ///
    /// Replaces any previous session, dropping its authorization. On failure the
    /// client is left unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] when the credentials are rejected or the
    /// access token does not carry the expected claims, and [`ClientError::ApiRequest`]
    /// when the provider cannot be reached.
    pub async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<&Session, ClientError> {
        self.session = None;

        let request = self
            .base_request(
                HttpMethod::Post,
                EndpointCategory::Authentication,
                AUTHENTICATE_PATH,
            )
            .json(json!({
                "username": email,
                "password": password,
                "locale": self.config.locale(),
            }));

        let body = self.send(request).await.map_err(|err| match err {
            TransportError::Status { .. } => ClientError::Authentication(err.to_string()),
            TransportError::Network(_) => ClientError::ApiRequest(err),
        })?;
        let response: AuthenticateResponse = serde_json::from_str(&body).map_err(|err| {
            ClientError::Authentication(format!("unexpected authenticate response: {err}"))
        })?;

        let session = Session::from_response(response, Utc::now())?;
        tracing::info!(
            user_id = %session.user_id(),
            expires_at = %session.expires_at(),
            "authenticated"
        );

        Ok(&*self.session.insert(session))
    }

    /// Exchange the session token for an authorization token at the issuer.
    ///
    /// A failed attempt leaves the session as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthorized`] before `authenticate`, and
    /// [`ClientError::Authorization`] when the issuer call fails or its page carries no token.
    pub async fn authorize(&mut self) -> Result<(), ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotAuthorized)?;

        let request = HttpRequest::get(format!(
            "{}/v1/authorize",
            session.issuer_url().trim_end_matches('/')
        ))
        .query("client_id", session.client_id())
        .query("nonce", AUTHORIZE_NONCE)
        .query("prompt", "none")
        .query("response_mode", AUTHORIZE_RESPONSE_MODE)
        .query("response_type", "token")
        .query("state", AUTHORIZE_STATE)
        .query("scope", AUTHORIZE_SCOPE)
        .query("redirect_uri", AUTHORIZE_REDIRECT_URI)
        .query("sessionToken", session.session_token());

        let body = self
            .send(request)
            .await
            .map_err(|err| ClientError::Authorization(err.to_string()))?;
        let token = extract_authorization_token(&body)?;

        let authorized = session.with_authorization(token);
        tracing::info!(user_id = %authorized.user_id(), "authorized");
        self.session = Some(authorized);

        Ok(())
    }

    /// Accounts linked to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthorized`] before `authorize`, [`ClientError::ApiRequest`]
    /// when the provider rejects the call, or [`ClientError::InvalidResponse`].
    pub async fn get_accounts(&self) -> Result<Vec<Account>, ClientError> {
        let session = self.authorized_session()?;
        let path = format!("authorize/user/{}/accounts", session.user_id());

        let request = self
            .signed_request(HttpMethod::Get, EndpointCategory::Accounts, &path)?
            .query("timestamp", Utc::now().timestamp_millis().to_string());

        let response: AccountsResponse = self.fetch_json(request).await?;
        Ok(response.into_accounts())
    }

    /// Services on an account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthorized`] before `authorize`, [`ClientError::ApiRequest`]
    /// when the provider rejects the call, or [`ClientError::InvalidResponse`].
    pub async fn get_services(&self, account_id: &AccountId) -> Result<Vec<Service>, ClientError> {
        let session = self.authorized_session()?;
        let path = format!("account/{account_id}/services");

        let request = self
            .signed_request(HttpMethod::Get, EndpointCategory::Services, &path)?
            .query("serviceChangeEligibility", "Y")
            .query("userId", session.user_id());

        let response: ServicesResponse = self.fetch_json(request).await?;
        Ok(response.into_services())
    }

    /// Upcoming pickups of a service, holiday shifts applied as of today.
    ///
    /// # Errors
    ///
    /// See [`WmClient::service_pickup_as_of`].
    pub async fn get_service_pickup(
        &self,
        account_id: &AccountId,
        service_id: &ServiceId,
    ) -> Result<PickupSchedule, ClientError> {
        self.service_pickup_as_of(account_id, service_id, Local::now().date_naive())
            .await
    }

    /// Upcoming pickups of a service, with year-less holiday dates resolved relative to `today`.
    ///
    /// When the pickup advisory mentions a holiday, the account's holiday advisory is fetched
    /// and only the flagged date is moved, if the advisory mentions it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthorized`] before `authorize`, [`ClientError::ApiRequest`]
    /// when either provider call fails, or [`ClientError::InvalidResponse`] for unreadable dates.
    pub async fn service_pickup_as_of(
        &self,
        account_id: &AccountId,
        service_id: &ServiceId,
        today: NaiveDate,
    ) -> Result<PickupSchedule, ClientError> {
        let session = self.authorized_session()?;
        let path = format!("account/{account_id}/service/{service_id}/pickupinfo");

        let request = self
            .signed_request(HttpMethod::Get, EndpointCategory::Services, &path)?
            .query("checkAlerts", "Y")
            .query("userId", session.user_id());

        let info: PickupInfoResponse = self.fetch_json(request).await?;

        let mut dates = info
            .pickup_schedule_info
            .pickup_dates
            .iter()
            .map(|raw| parse_pickup_date(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let day_info = info.pickup_day_info;
        if !day_info.message.as_deref().is_some_and(signals_holiday) {
            return Ok(PickupSchedule::new(dates));
        }

        let Some(flagged) = day_info.date.as_deref().map(parse_pickup_date).transpose()? else {
            tracing::warn!(%account_id, %service_id, "holiday advisory without a date");
            return Ok(PickupSchedule::new(dates));
        };

        let impact = self.holidays_as_of(account_id, today).await?;
        match impact.get(flagged) {
            Some(adjusted) => {
                tracing::debug!(%flagged, %adjusted, "applying holiday shift");
                for date in dates.iter_mut().filter(|date| **date == flagged) {
                    *date = adjusted;
                }
            }
            None => tracing::warn!(
                %account_id,
                %flagged,
                "holiday flagged but the advisory does not mention the date"
            ),
        }

        Ok(PickupSchedule::new(dates))
    }

    /// Holiday shifts announced for an account, as of today.
    ///
    /// # Errors
    ///
    /// See [`WmClient::holidays_as_of`].
    pub async fn get_holidays(&self, account_id: &AccountId) -> Result<HolidayImpact, ClientError> {
        self.holidays_as_of(account_id, Local::now().date_naive())
            .await
    }

    /// Holiday shifts announced for an account, year-less dates resolved relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotAuthorized`] before `authorize`, [`ClientError::ApiRequest`]
    /// when the provider rejects the call, or [`ClientError::InvalidResponse`].
    pub async fn holidays_as_of(
        &self,
        account_id: &AccountId,
        today: NaiveDate,
    ) -> Result<HolidayImpact, ClientError> {
        let session = self.authorized_session()?;
        let path = format!("account/{account_id}/holidays");

        let request = self
            .signed_request(HttpMethod::Get, EndpointCategory::Holidays, &path)?
            .query("userId", session.user_id());

        let response: HolidaysResponse = self.fetch_json(request).await?;

        let mut impact = HolidayImpact::new();
        for advisory in response
            .holiday_data
            .into_iter()
            .filter_map(|entry| entry.holiday_hours)
        {
            impact.merge(parse_impacted_dates(&advisory, today));
        }

        Ok(impact)
    }

    fn authorized_session(&self) -> Result<&Session, ClientError> {
        self.session
            .as_ref()
            .filter(|session| session.state() == SessionState::Authorized)
            .ok_or(ClientError::NotAuthorized)
    }

    /// Request against the REST endpoint carrying the content type and the category's api key.
    fn base_request(
        &self,
        method: HttpMethod,
        category: EndpointCategory,
        path: &str,
    ) -> HttpRequest {
        let url = self.config.endpoint(path);
        let request = match method {
            HttpMethod::Get => HttpRequest::get(url),
            HttpMethod::Post => HttpRequest::post(url),
        };

        request
            .header(CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE)
            .header(API_KEY_HEADER, self.config.api_keys().for_category(category))
    }

    /// [`Self::base_request`] plus the authorization token and locale.
    fn signed_request(
        &self,
        method: HttpMethod,
        category: EndpointCategory,
        path: &str,
    ) -> Result<HttpRequest, ClientError> {
        let token = self
            .authorized_session()?
            .authorization_token()
            .ok_or(ClientError::NotAuthorized)?;

        Ok(self
            .base_request(method, category, path)
            .header(AUTHORIZATION_HEADER, token)
            .query("lang", self.config.locale()))
    }

    async fn send(&self, request: HttpRequest) -> Result<String, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        self.transport.send(request).await
    }

    // Small helper to fetch and decode JSON with status handling.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<T, ClientError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|err| ClientError::InvalidResponse(err.to_string()))
    }
}
