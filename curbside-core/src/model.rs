//! Domain data structures for accounts, services, and pickup schedules.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a customer account (`custAccountId`).
pub struct AccountId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a service attached to an account (`serviceId`).
pub struct ServiceId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Account linked to the signed-in user.
pub struct Account {
    /// Identifier used when requesting services and holidays.
    pub id: AccountId,
    /// Human-friendly label built from the service address.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Collection service (trash, recycling, ...) on an account.
pub struct Service {
    /// Identifier used when requesting the pickup schedule.
    pub id: ServiceId,
    /// Provider description of the service.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Scheduled pickups for one service, in provider order.
pub struct PickupSchedule {
    /// Pickup dates, holiday adjustments already applied.
    pub dates: Vec<NaiveDate>,
}

impl PickupSchedule {
    /// Wrap a list of pickup dates.
    #[must_use]
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self { dates }
    }

    /// Next pickup on or after `today`.
    #[must_use]
    pub fn next_after(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.dates.iter().copied().filter(|date| *date >= today).min()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Dates mentioned in a holiday advisory mapped to the day service actually happens.
///
/// Values are never earlier than their key.
pub struct HolidayImpact {
    shifts: BTreeMap<NaiveDate, NaiveDate>,
}

impl HolidayImpact {
    /// Empty impact, nothing moves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `scheduled` being serviced on `adjusted`.
    ///
    /// An `adjusted` date before `scheduled` is clamped to `scheduled`.
    pub fn insert(&mut self, scheduled: NaiveDate, adjusted: NaiveDate) {
        self.shifts.insert(scheduled, adjusted.max(scheduled));
    }

    /// Adjusted date for `scheduled`, if the advisory mentions it.
    #[must_use]
    pub fn get(&self, scheduled: NaiveDate) -> Option<NaiveDate> {
        self.shifts.get(&scheduled).copied()
    }

    /// Fold `other` into `self`. An explicit delay already present is kept;
    /// a no-delay entry is replaced by a delay from `other`.
    pub fn merge(&mut self, other: HolidayImpact) {
        for (scheduled, adjusted) in other.shifts {
            match self.shifts.entry(scheduled) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(adjusted);
                }
                btree_map::Entry::Occupied(mut slot) => {
                    if *slot.get() == scheduled {
                        slot.insert(adjusted);
                    }
                }
            }
        }
    }

    /// Number of dates mentioned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    /// Whether the advisory mentioned no dates at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Iterate `(scheduled, adjusted)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, NaiveDate)> + '_ {
        self.shifts.iter().map(|(scheduled, adjusted)| (*scheduled, *adjusted))
    }
}

impl FromIterator<(NaiveDate, NaiveDate)> for HolidayImpact {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, NaiveDate)>>(iter: I) -> Self {
        let mut impact = Self::new();
        for (scheduled, adjusted) in iter {
            impact.insert(scheduled, adjusted);
        }
        impact
    }
}
