//! Authentication phase signal.
//!
//! Sign-in itself lives outside this crate; the orchestrator only observes
//! which phase the session is in and reacts to changes.

use std::sync::Arc;

use tokio::sync::watch;

/// Where the surrounding session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
}

impl AuthPhase {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Publisher side of the auth phase, owned by whoever manages sign-in.
#[derive(Debug, Clone)]
pub struct AuthSignal {
    tx: Arc<watch::Sender<AuthPhase>>,
}

impl AuthSignal {
    pub fn new(initial: AuthPhase) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthPhase> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> AuthPhase {
        *self.tx.borrow()
    }

    /// Publish a new phase. Subscribers are only woken on an actual change.
    pub fn set(&self, phase: AuthPhase) {
        self.tx.send_if_modified(|current| {
            if *current == phase {
                return false;
            }
            tracing::debug!(from = ?*current, to = ?phase, "Auth phase changed");
            *current = phase;
            true
        });
    }
}

impl Default for AuthSignal {
    fn default() -> Self {
        Self::new(AuthPhase::default())
    }
}
