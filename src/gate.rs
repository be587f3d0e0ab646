//! Accounting start gate: the one-time prerequisite that must exist before
//! onboarding can be offered.
//!
//! The date is write-once: the gate only ever offers a create path, and the
//! cached value is updated solely from what the server confirms. A failed
//! save leaves the cache absent so the user can retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, NaiveDate};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ProfileApi;
use crate::auth::AuthPhase;
use crate::error::{Operation, PersistenceError, Result, ValidationError, ValidationReason};

/// Name used for the date in validation errors.
pub const FIELD: &str = "accounting start date";

/// Observable gate state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateSnapshot {
    pub date: Option<NaiveDate>,
    /// A load or save is outstanding.
    pub loading: bool,
    /// At least one load has finished for the current session.
    pub loaded: bool,
    /// Last human-readable failure.
    pub error: Option<String>,
}

impl GateSnapshot {
    pub fn is_satisfied(&self) -> bool {
        self.date.is_some()
    }

    /// Whether the blocking date prompt should be shown.
    ///
    /// Never true while a load is outstanding, so the prompt does not flash
    /// before the first answer arrives.
    pub fn is_open(&self, phase: AuthPhase) -> bool {
        phase.is_authenticated() && self.loaded && !self.loading && self.date.is_none()
    }
}

/// Check a submitted date against today's local date.
pub fn validate_candidate(
    candidate: &str,
    today: NaiveDate,
) -> std::result::Result<NaiveDate, ValidationError> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Err(ValidationError::new(FIELD, ValidationReason::Missing));
    }
    let date = NaiveDate::parse_from_str(candidate, "%Y-%m-%d")
        .map_err(|_| ValidationError::new(FIELD, ValidationReason::Malformed))?;
    if date > today {
        return Err(ValidationError::new(FIELD, ValidationReason::InFuture));
    }
    Ok(date)
}

/// Owns the cached accounting start date for the signed-in user.
pub struct AccountingStartGate {
    api: Arc<dyn ProfileApi>,
    auth: watch::Receiver<AuthPhase>,
    state: watch::Sender<GateSnapshot>,
    /// Bumped by every load and every reset; only the newest load may apply.
    generation: AtomicU64,
    /// Bumped on reset; saves from a previous session are dropped.
    session: AtomicU64,
}

impl AccountingStartGate {
    pub fn new(api: Arc<dyn ProfileApi>, auth: watch::Receiver<AuthPhase>) -> Arc<Self> {
        let (state, _rx) = watch::channel(GateSnapshot::default());
        Arc::new(Self {
            api,
            auth,
            state,
            generation: AtomicU64::new(0),
            session: AtomicU64::new(0),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<GateSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> GateSnapshot {
        self.state.borrow().clone()
    }

    /// Current cached date.
    pub fn date(&self) -> Option<NaiveDate> {
        self.state.borrow().date
    }

    pub fn is_satisfied(&self) -> bool {
        self.state.borrow().is_satisfied()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open(*self.auth.borrow())
    }

    /// Reload the date from the profile resource.
    ///
    /// Outside an authenticated session this clears the cache instead. A
    /// failure keeps the previous value and records the message. When loads
    /// overlap, only the most recently started one is applied.
    pub async fn refresh(&self) -> Result<()> {
        if !self.auth.borrow().is_authenticated() {
            self.reset();
            return Ok(());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.api.fetch_profile().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding superseded profile load");
            return Ok(());
        }

        match result {
            Ok(profile) => {
                debug!(date = ?profile.accounting_start_date, "Accounting start date loaded");
                self.state.send_modify(|s| {
                    s.date = profile.accounting_start_date;
                    s.loading = false;
                    s.loaded = true;
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load accounting start date");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.loaded = true;
                    s.error = Some(e.to_string());
                });
                Err(e.into())
            }
        }
    }

    /// Validate and save the date, using today's local calendar date as the
    /// upper bound.
    pub async fn set_date(&self, candidate: &str) -> Result<NaiveDate> {
        self.set_date_as_of(candidate, Local::now().date_naive()).await
    }

    /// Validate and save the date against an explicit "today".
    ///
    /// Validation failures return before any network call and leave the
    /// gate's own error slot untouched. On a remote failure the cache stays
    /// absent and the error is returned for the caller to surface.
    pub async fn set_date_as_of(&self, candidate: &str, today: NaiveDate) -> Result<NaiveDate> {
        let date = validate_candidate(candidate, today)?;

        let session = self.session.load(Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        // An acknowledgement without a date is not a confirmation.
        let result = self
            .api
            .set_accounting_start_date(date)
            .await
            .and_then(|profile| {
                profile.accounting_start_date.ok_or_else(|| {
                    PersistenceError::new(
                        Operation::SaveAccountingStartDate,
                        "Server did not confirm the accounting start date",
                    )
                })
            });

        if self.session.load(Ordering::SeqCst) != session {
            warn!("Session ended while saving accounting start date; ignoring response");
            return result.map_err(Into::into);
        }

        match result {
            Ok(confirmed) => {
                info!(submitted = %date, %confirmed, "Accounting start date saved");
                // A save outranks any load that was in flight.
                self.generation.fetch_add(1, Ordering::SeqCst);
                self.state.send_modify(|s| {
                    s.date = Some(confirmed);
                    s.loading = false;
                    s.loaded = true;
                });
                Ok(confirmed)
            }
            Err(e) => {
                warn!(error = %e, "Failed to save accounting start date");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
                Err(e.into())
            }
        }
    }

    /// Drop all cached state, e.g. on sign-out. No remote call is made and
    /// responses still in flight are ignored when they arrive.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.session.fetch_add(1, Ordering::SeqCst);
        self.state.send_if_modified(|s| {
            if *s == GateSnapshot::default() {
                return false;
            }
            *s = GateSnapshot::default();
            true
        });
    }
}
