//! Billing periods attached to a subscription.
//!
//! A period is identified by its full key (subscription, source, start, end).
//! Because the boundaries are part of the key, a stored period is never
//! updated: a different boundary is a different period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    SubscriptionId, SubscriptionPeriodId, Timestamp, ValidationError,
};

/// Origin of a billing period row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodSource {
    FastSpring,
}

impl PeriodSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodSource::FastSpring => "fastspring",
        }
    }
}

impl fmt::Display for PeriodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fastspring" => Ok(PeriodSource::FastSpring),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown period source '{}'", other),
            )),
        }
    }
}

/// The find-or-create key of a billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewSubscriptionPeriod {
    pub subscription_id: SubscriptionId,
    pub source: PeriodSource,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewSubscriptionPeriod {
    /// Builds a FastSpring period from Unix-second boundaries.
    ///
    /// Each boundary is truncated to its UTC calendar day.
    pub fn from_fastspring_secs(
        subscription_id: SubscriptionId,
        start_secs: i64,
        end_secs: i64,
    ) -> Result<Self, ValidationError> {
        let start_date = Timestamp::from_unix_secs(start_secs)
            .map_err(|_| out_of_range("periodStartDateInSeconds", start_secs))?
            .calendar_date();
        let end_date = Timestamp::from_unix_secs(end_secs)
            .map_err(|_| out_of_range("periodEndDateInSeconds", end_secs))?
            .calendar_date();

        Ok(Self {
            subscription_id,
            source: PeriodSource::FastSpring,
            start_date,
            end_date,
        })
    }
}

fn out_of_range(field: &str, secs: i64) -> ValidationError {
    ValidationError::invalid_format(field, format!("{} is not a representable timestamp", secs))
}

/// A persisted billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPeriod {
    pub id: SubscriptionPeriodId,
    pub subscription_id: SubscriptionId,
    pub source: PeriodSource,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: Timestamp,
}

impl SubscriptionPeriod {
    /// Materialises a period from its key.
    pub fn from_new(id: SubscriptionPeriodId, new: NewSubscriptionPeriod) -> Self {
        Self {
            id,
            subscription_id: new.subscription_id,
            source: new.source,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: Timestamp::now(),
        }
    }

    /// Returns the find-or-create key of this period.
    pub fn key(&self) -> NewSubscriptionPeriod {
        NewSubscriptionPeriod {
            subscription_id: self.subscription_id,
            source: self.source,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Outcome of a find-or-create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOrCreate<T> {
    Found(T),
    Created(T),
}

impl<T> FindOrCreate<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, FindOrCreate::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            FindOrCreate::Found(value) | FindOrCreate::Created(value) => value,
        }
    }
}
