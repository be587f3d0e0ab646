//! In-memory stand-ins for the remote ports, shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use crate::api::{OnboardingApi, OnboardingRecord, ProfileApi, UserProfile};
use crate::error::{Operation, PersistenceError};
use crate::onboarding::state::{DeviceType, OnboardingStatus};

/// Mock backend implementing both ports, with call counters and switches
/// for failures and held responses.
pub struct MockBackend {
    pub status: Mutex<OnboardingStatus>,
    pub start_date: Mutex<Option<NaiveDate>>,
    /// When set, the date write answers with this instead of the submitted value.
    pub normalized_date: Mutex<Option<NaiveDate>>,
    pub status_writes: Mutex<Vec<OnboardingStatus>>,

    pub fail_status_read: AtomicBool,
    pub fail_status_write: AtomicBool,
    pub fail_profile_read: AtomicBool,
    pub fail_date_write: AtomicBool,
    /// When set, the date write is acknowledged with a null date.
    pub confirm_without_date: AtomicBool,

    pub status_reads: AtomicUsize,
    pub profile_reads: AtomicUsize,
    pub date_writes: AtomicUsize,

    /// While set, every read parks until released.
    pub holding: AtomicBool,
    /// One entry per parked read, in arrival order.
    pub held_reads: Mutex<Vec<Arc<Notify>>>,
}

impl MockBackend {
    pub fn new(status: OnboardingStatus, start_date: Option<NaiveDate>) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            start_date: Mutex::new(start_date),
            normalized_date: Mutex::new(None),
            status_writes: Mutex::new(Vec::new()),
            fail_status_read: AtomicBool::new(false),
            fail_status_write: AtomicBool::new(false),
            fail_profile_read: AtomicBool::new(false),
            fail_date_write: AtomicBool::new(false),
            confirm_without_date: AtomicBool::new(false),
            status_reads: AtomicUsize::new(0),
            profile_reads: AtomicUsize::new(0),
            date_writes: AtomicUsize::new(0),
            holding: AtomicBool::new(false),
            held_reads: Mutex::new(Vec::new()),
        })
    }

    /// Park every following read until it is released.
    pub fn hold(&self) {
        self.holding.store(true, Ordering::SeqCst);
    }

    /// Let the `index`-th parked read answer. It reads the backend state at
    /// that moment, so tests can change the answer between releases.
    pub fn release_read(&self, index: usize) {
        if let Some(notify) = self.held_reads.lock().unwrap().get(index) {
            notify.notify_one();
        }
    }

    /// Let every parked read answer; later reads are no longer held.
    pub fn release(&self) {
        self.holding.store(false, Ordering::SeqCst);
        for notify in self.held_reads.lock().unwrap().iter() {
            notify.notify_one();
        }
    }

    pub fn writes(&self) -> Vec<OnboardingStatus> {
        self.status_writes.lock().unwrap().clone()
    }

    pub fn remote_status(&self) -> OnboardingStatus {
        *self.status.lock().unwrap()
    }

    async fn wait_if_held(&self) {
        if !self.holding.load(Ordering::SeqCst) {
            return;
        }
        let notify = Arc::new(Notify::new());
        self.held_reads.lock().unwrap().push(Arc::clone(&notify));
        notify.notified().await;
    }
}

#[async_trait]
impl OnboardingApi for MockBackend {
    async fn fetch_status(
        &self,
        device_type: DeviceType,
    ) -> Result<OnboardingRecord, PersistenceError> {
        self.status_reads.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held().await;
        if self.fail_status_read.load(Ordering::SeqCst) {
            return Err(PersistenceError::new(
                Operation::LoadOnboardingStatus,
                "Service unavailable",
            ));
        }
        Ok(OnboardingRecord {
            device_type,
            status: self.remote_status(),
        })
    }

    async fn update_status(
        &self,
        device_type: DeviceType,
        status: OnboardingStatus,
    ) -> Result<OnboardingRecord, PersistenceError> {
        self.status_writes.lock().unwrap().push(status);
        if self.fail_status_write.load(Ordering::SeqCst) {
            return Err(PersistenceError::new(
                Operation::SaveOnboardingStatus,
                "connection reset",
            ));
        }
        *self.status.lock().unwrap() = status;
        Ok(OnboardingRecord {
            device_type,
            status,
        })
    }
}

#[async_trait]
impl ProfileApi for MockBackend {
    async fn fetch_profile(&self) -> Result<UserProfile, PersistenceError> {
        self.profile_reads.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held().await;
        if self.fail_profile_read.load(Ordering::SeqCst) {
            return Err(PersistenceError::new(Operation::LoadProfile, "Unauthorized"));
        }
        Ok(UserProfile {
            id: Some(1),
            accounting_start_date: *self.start_date.lock().unwrap(),
        })
    }

    async fn set_accounting_start_date(
        &self,
        date: NaiveDate,
    ) -> Result<UserProfile, PersistenceError> {
        self.date_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_date_write.load(Ordering::SeqCst) {
            return Err(PersistenceError::new(
                Operation::SaveAccountingStartDate,
                "Accounting start date is already set.",
            ));
        }
        if self.confirm_without_date.load(Ordering::SeqCst) {
            return Ok(UserProfile {
                id: Some(1),
                accounting_start_date: None,
            });
        }
        let stored = self.normalized_date.lock().unwrap().unwrap_or(date);
        *self.start_date.lock().unwrap() = Some(stored);
        Ok(UserProfile {
            id: Some(1),
            accounting_start_date: Some(stored),
        })
    }
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
