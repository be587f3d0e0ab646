//! Owns the cached onboarding status and the step cursor, and persists
//! every transition to the backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::OnboardingApi;
use crate::auth::AuthPhase;
use crate::error::{Result, TransitionError};

use super::state::{DeviceType, OnboardingEvent, OnboardingStatus};
use super::steps::{self, Step, StepProgress};

/// Observable store state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingSnapshot {
    /// `None` until the first load of the session finishes.
    pub status: Option<OnboardingStatus>,
    pub loading: bool,
    pub error: Option<String>,
    /// Index into [`steps::STEPS`]; always 0 unless in progress.
    pub cursor: usize,
}

impl OnboardingSnapshot {
    pub fn active_step(&self) -> Option<&'static Step> {
        steps::active_step(self.status, self.cursor)
    }

    pub fn is_wizard_open(&self) -> bool {
        self.status == Some(OnboardingStatus::InProgress)
    }

    pub fn progress(&self) -> Option<StepProgress> {
        self.is_wizard_open().then(|| steps::progress(self.cursor))
    }

    fn set_status(&mut self, status: Option<OnboardingStatus>) {
        if status != Some(OnboardingStatus::InProgress) {
            self.cursor = 0;
        }
        self.status = status;
    }
}

/// Coordinates onboarding status transitions for one device type.
///
/// Transitions are optimistic: the local status changes first, then the
/// write is sent. A failed write is reported but the local status is kept.
pub struct OnboardingStore {
    api: Arc<dyn OnboardingApi>,
    auth: watch::Receiver<AuthPhase>,
    device_type: DeviceType,
    state: watch::Sender<OnboardingSnapshot>,
    /// Bumped by every load, every transition, and every reset.
    generation: AtomicU64,
    /// Bumped only by loads; the newest load owns the `loading` flag.
    load_generation: AtomicU64,
    /// Bumped on reset; write failures from a previous session are dropped.
    session: AtomicU64,
}

impl OnboardingStore {
    pub fn new(
        api: Arc<dyn OnboardingApi>,
        auth: watch::Receiver<AuthPhase>,
        device_type: DeviceType,
    ) -> Arc<Self> {
        let (state, _rx) = watch::channel(OnboardingSnapshot::default());
        Arc::new(Self {
            api,
            auth,
            device_type,
            state,
            generation: AtomicU64::new(0),
            load_generation: AtomicU64::new(0),
            session: AtomicU64::new(0),
        })
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> OnboardingSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> Option<OnboardingStatus> {
        self.state.borrow().status
    }

    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }

    pub fn active_step(&self) -> Option<&'static Step> {
        self.state.borrow().active_step()
    }

    pub fn is_wizard_open(&self) -> bool {
        self.state.borrow().is_wizard_open()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Re-fetch the status from the backend unconditionally.
    ///
    /// Outside an authenticated session this clears local state instead.
    /// A transition made while the load is in flight wins over its result.
    pub async fn refresh(&self) -> Result<()> {
        if !self.auth.borrow().is_authenticated() {
            self.reset();
            return Ok(());
        }

        let load = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.api.fetch_status(self.device_type).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding superseded onboarding status load");
            // Superseded by a transition or reset rather than a newer load:
            // nobody else will clear the flag.
            if self.load_generation.load(Ordering::SeqCst) == load {
                self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
            }
            return Ok(());
        }

        match result {
            Ok(record) => {
                debug!(status = %record.status, device = %self.device_type, "Onboarding status loaded");
                self.state.send_modify(|s| {
                    s.set_status(Some(record.status));
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load onboarding status");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
                Err(e.into())
            }
        }
    }

    /// PENDING → IN_PROGRESS, with the cursor on the first step.
    pub async fn start_onboarding(&self) -> Result<()> {
        self.transition(OnboardingEvent::Start).await
    }

    /// PENDING or IN_PROGRESS → POSTPONED.
    pub async fn postpone_onboarding(&self) -> Result<()> {
        self.transition(OnboardingEvent::Postpone).await
    }

    /// PENDING or IN_PROGRESS → SKIPPED.
    pub async fn skip_onboarding(&self) -> Result<()> {
        self.transition(OnboardingEvent::Skip).await
    }

    /// IN_PROGRESS → COMPLETED.
    pub async fn complete_onboarding(&self) -> Result<()> {
        self.transition(OnboardingEvent::Complete).await
    }

    /// Apply `event` locally, then persist the new status.
    ///
    /// Events with no edge from the current status fail without touching
    /// local state or the network.
    pub async fn transition(&self, event: OnboardingEvent) -> Result<()> {
        let mut rejected = None;
        let mut next = None;
        self.state.send_if_modified(|s| {
            let from = s.status;
            match from.and_then(|status| status.apply(event)) {
                Some(to) => {
                    s.set_status(Some(to));
                    if event == OnboardingEvent::Start {
                        s.cursor = 0;
                    }
                    next = Some(to);
                    true
                }
                None => {
                    rejected = Some(TransitionError { from, event });
                    false
                }
            }
        });

        if let Some(err) = rejected {
            warn!(%err, "Rejected onboarding transition");
            return Err(err.into());
        }
        let Some(status) = next else {
            return Ok(());
        };

        // A load still in flight must not overwrite this transition.
        self.generation.fetch_add(1, Ordering::SeqCst);
        info!(%event, %status, device = %self.device_type, "Onboarding status changed");

        if !self.auth.borrow().is_authenticated() {
            debug!("Not authenticated; keeping transition local");
            return Ok(());
        }

        let session = self.session.load(Ordering::SeqCst);
        match self.api.update_status(self.device_type, status).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, %status, "Failed to persist onboarding status; keeping local value");
                if self.session.load(Ordering::SeqCst) == session {
                    self.state.send_modify(|s| s.error = Some(e.to_string()));
                }
                Err(e.into())
            }
        }
    }

    /// Move to the next step. No-op unless onboarding is in progress.
    pub fn next_step(&self) {
        self.move_cursor(steps::advance);
    }

    /// Move to the previous step. No-op unless onboarding is in progress.
    pub fn previous_step(&self) {
        self.move_cursor(steps::retreat);
    }

    fn move_cursor(&self, f: fn(usize) -> usize) {
        self.state.send_if_modified(|s| {
            if !s.is_wizard_open() {
                return false;
            }
            let cursor = f(s.cursor);
            if cursor == s.cursor {
                return false;
            }
            debug!(from = s.cursor, to = cursor, "Onboarding step changed");
            s.cursor = cursor;
            true
        });
    }

    /// The wizard's primary action: complete on the last step, otherwise
    /// move forward.
    pub async fn advance_or_complete(&self) -> Result<()> {
        if steps::is_last(self.cursor()) {
            self.complete_onboarding().await
        } else {
            self.next_step();
            Ok(())
        }
    }

    /// Forget everything cached for the session. No remote call is made.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.session.fetch_add(1, Ordering::SeqCst);
        self.state.send_if_modified(|s| {
            if *s == OnboardingSnapshot::default() {
                return false;
            }
            *s = OnboardingSnapshot::default();
            true
        });
    }
}
