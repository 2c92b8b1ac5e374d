//! Payloads of the provider REST API.

use chrono::NaiveDate;
use serde::Deserialize;

use curbside_core::{Account, AccountId, ClientError, Service, ServiceId};

/// Format of `pickupDates` and `pickupDayInfo.date`.
const PICKUP_DATE_FORMAT: &str = "%m-%d-%Y";

/// Response from `authorize/user/{userId}/accounts`
#[derive(Debug, Deserialize)]
pub(crate) struct AccountsResponse {
    data: LinkedAccounts,
}

#[derive(Debug, Deserialize)]
struct LinkedAccounts {
    #[serde(rename = "linkedAccounts")]
    linked_accounts: Vec<LinkedAccount>,
}

#[derive(Debug, Deserialize)]
struct LinkedAccount {
    #[serde(rename = "custAccountId")]
    cust_account_id: String,
    #[serde(rename = "serviceAddress")]
    service_address: ServiceAddress,
    // many other fields exist, we ignore them
}

#[derive(Debug, Deserialize)]
struct ServiceAddress {
    street: String,
    city: String,
    state: String,
}

impl AccountsResponse {
    pub(crate) fn into_accounts(self) -> Vec<Account> {
        self.data
            .linked_accounts
            .into_iter()
            .map(|entry| {
                let address = entry.service_address;
                Account {
                    id: AccountId(entry.cust_account_id),
                    name: format!("{} {} {}", address.street, address.city, address.state),
                }
            })
            .collect()
    }
}

/// Response from `account/{accountId}/services`
#[derive(Debug, Deserialize)]
pub(crate) struct ServicesResponse {
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    #[serde(rename = "serviceId")]
    service_id: String,
    #[serde(rename = "serviceDescription")]
    service_description: String,
}

impl ServicesResponse {
    pub(crate) fn into_services(self) -> Vec<Service> {
        self.services
            .into_iter()
            .map(|entry| Service {
                id: ServiceId(entry.service_id),
                name: entry.service_description,
            })
            .collect()
    }
}

/// Response from `account/{accountId}/service/{serviceId}/pickupinfo`
#[derive(Debug, Deserialize)]
pub(crate) struct PickupInfoResponse {
    #[serde(rename = "pickupDayInfo", default)]
    pub(crate) pickup_day_info: PickupDayInfo,
    #[serde(rename = "pickupScheduleInfo")]
    pub(crate) pickup_schedule_info: PickupScheduleInfo,
}

/// Advisory about the next pickup; mentions "holiday" when one is impacted.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PickupDayInfo {
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PickupScheduleInfo {
    #[serde(rename = "pickupDates", default)]
    pub(crate) pickup_dates: Vec<String>,
}

/// Response from `account/{accountId}/holidays`
#[derive(Debug, Deserialize)]
pub(crate) struct HolidaysResponse {
    #[serde(rename = "holidayData", default)]
    pub(crate) holiday_data: Vec<HolidayEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HolidayEntry {
    #[serde(rename = "holidayHours", default)]
    pub(crate) holiday_hours: Option<String>,
}

/// Parse a `MM-DD-YYYY` date from a pickup payload.
pub(crate) fn parse_pickup_date(raw: &str) -> Result<NaiveDate, ClientError> {
    NaiveDate::parse_from_str(raw.trim(), PICKUP_DATE_FORMAT)
        .map_err(|err| ClientError::InvalidResponse(format!("pickup date {raw:?}: {err}")))
}
