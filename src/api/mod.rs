//! Remote resources consumed by the orchestrator.
//!
//! Two ports: the per-device onboarding status and the user profile that
//! carries the accounting start date. `HttpBackend` implements both against
//! the JSON backend; tests substitute in-memory mocks.

pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::onboarding::state::{DeviceType, OnboardingStatus};

/// Onboarding status record as exchanged with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub device_type: DeviceType,
    pub status: OnboardingStatus,
}

/// The subset of the user profile this crate reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub accounting_start_date: Option<NaiveDate>,
}

/// Body of the accounting start date write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccountingStartDateUpdate {
    pub accounting_start_date: NaiveDate,
}

#[async_trait]
pub trait OnboardingApi: Send + Sync {
    /// Read the status for one device type. A user that never touched
    /// onboarding is reported as `PENDING` by the server.
    async fn fetch_status(&self, device_type: DeviceType)
    -> Result<OnboardingRecord, PersistenceError>;

    /// Overwrite the status for one device type.
    async fn update_status(
        &self,
        device_type: DeviceType,
        status: OnboardingStatus,
    ) -> Result<OnboardingRecord, PersistenceError>;
}

#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn fetch_profile(&self) -> Result<UserProfile, PersistenceError>;

    /// Set the accounting start date. The server rejects a second write and
    /// may normalize the value it stores.
    async fn set_accounting_start_date(
        &self,
        date: NaiveDate,
    ) -> Result<UserProfile, PersistenceError>;
}
