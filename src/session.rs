//! Keeps the gate and the onboarding store in step with the authentication
//! phase.
//!
//! Both services are built once at startup and shared by reference; this
//! module only decides when they load and when they forget.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::AuthPhase;
use crate::gate::AccountingStartGate;
use crate::onboarding::invitation::{self, InvitationInputs, Presentation};
use crate::onboarding::store::OnboardingStore;

pub struct Session {
    gate: Arc<AccountingStartGate>,
    store: Arc<OnboardingStore>,
    task: JoinHandle<()>,
}

impl Session {
    /// Spawn the task that loads both services on sign-in and clears them
    /// on sign-out. The current phase is applied immediately.
    pub fn start(
        mut auth: watch::Receiver<AuthPhase>,
        gate: Arc<AccountingStartGate>,
        store: Arc<OnboardingStore>,
    ) -> Self {
        let task = tokio::spawn({
            let gate = Arc::clone(&gate);
            let store = Arc::clone(&store);
            async move {
                loop {
                    let phase = *auth.borrow_and_update();
                    apply_phase(&gate, &store, phase).await;
                    if auth.changed().await.is_err() {
                        break;
                    }
                }
                debug!("Auth signal closed; session task stopped");
            }
        });
        Self { gate, store, task }
    }

    pub fn gate(&self) -> &Arc<AccountingStartGate> {
        &self.gate
    }

    pub fn store(&self) -> &Arc<OnboardingStore> {
        &self.store
    }

    /// What the onboarding UI should currently show.
    pub fn presentation(&self) -> Presentation {
        let gate = self.gate.snapshot();
        let onboarding = self.store.snapshot();
        invitation::decide(InvitationInputs::from_snapshots(&gate, &onboarding))
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

/// Load both services when authenticated, otherwise drop their caches.
pub async fn apply_phase(gate: &AccountingStartGate, store: &OnboardingStore, phase: AuthPhase) {
    if phase.is_authenticated() {
        info!("Authenticated; loading onboarding state");
        let (gate_result, store_result) = futures::join!(gate.refresh(), store.refresh());
        if let Err(e) = gate_result {
            warn!(error = %e, "Accounting start date unavailable");
        }
        if let Err(e) = store_result {
            warn!(error = %e, "Onboarding status unavailable");
        }
    } else {
        debug!(?phase, "Not authenticated; clearing onboarding state");
        gate.reset();
        store.reset();
    }
}
