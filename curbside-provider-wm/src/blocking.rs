//! Synchronous facade over [`WmClient`].

use std::io;

use chrono::NaiveDate;
use tokio::runtime::{Builder, Runtime};

use curbside_core::{
    Account, AccountId, ClientError, HolidayImpact, PickupSchedule, Service, ServiceId,
};

use crate::client::WmClient;
use crate::session::{Session, SessionState};

/// Blocking client driving a [`WmClient`] on its own current-thread runtime.
///
/// Must not be used from inside an async runtime.
pub struct BlockingWmClient {
    runtime: Runtime,
    inner: WmClient,
}

impl BlockingWmClient {
    /// Wrap `inner` with a dedicated runtime.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the runtime cannot be started.
    pub fn new(inner: WmClient) -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime, inner })
    }

    /// Where the client stands in the sign-in flow.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    /// See [`WmClient::authenticate`].
    ///
    /// # Errors
    ///
    /// See [`WmClient::authenticate`].
    pub fn authenticate(&mut self, email: &str, password: &str) -> Result<Session, ClientError> {
        self.runtime
            .block_on(self.inner.authenticate(email, password))
            .cloned()
    }

    /// See [`WmClient::authorize`].
    ///
    /// # Errors
    ///
    /// See [`WmClient::authorize`].
    pub fn authorize(&mut self) -> Result<(), ClientError> {
        self.runtime.block_on(self.inner.authorize())
    }

    /// See [`WmClient::get_accounts`].
    ///
    /// # Errors
    ///
    /// See [`WmClient::get_accounts`].
    pub fn get_accounts(&self) -> Result<Vec<Account>, ClientError> {
        self.runtime.block_on(self.inner.get_accounts())
    }

    /// See [`WmClient::get_services`].
    ///
    /// # Errors
    ///
    /// See [`WmClient::get_services`].
    pub fn get_services(&self, account_id: &AccountId) -> Result<Vec<Service>, ClientError> {
        self.runtime.block_on(self.inner.get_services(account_id))
    }

    /// See [`WmClient::get_service_pickup`].
    ///
    /// # Errors
    ///
    /// See [`WmClient::get_service_pickup`].
    pub fn get_service_pickup(
        &self,
        account_id: &AccountId,
        service_id: &ServiceId,
    ) -> Result<PickupSchedule, ClientError> {
        self.runtime
            .block_on(self.inner.get_service_pickup(account_id, service_id))
    }

    /// See [`WmClient::service_pickup_as_of`].
    ///
    /// # Errors
    ///
    /// See [`WmClient::service_pickup_as_of`].
    pub fn service_pickup_as_of(
        &self,
        account_id: &AccountId,
        service_id: &ServiceId,
        today: NaiveDate,
    ) -> Result<PickupSchedule, ClientError> {
        self.runtime
            .block_on(self.inner.service_pickup_as_of(account_id, service_id, today))
    }

    /// See [`WmClient::get_holidays`].
    ///
    /// # Errors
    ///
    /// See [`WmClient::get_holidays`].
    pub fn get_holidays(&self, account_id: &AccountId) -> Result<HolidayImpact, ClientError> {
        self.runtime.block_on(self.inner.get_holidays(account_id))
    }
}
