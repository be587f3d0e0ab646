//! Keeps the application's route on the active onboarding step.
//!
//! Sync is one-way: the step decides the route. Navigating elsewhere while
//! the wizard is open is corrected on the next change notification, and a
//! route is never mapped back to a step.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::steps::Step;
use super::store::OnboardingSnapshot;

/// Host routing facility.
pub trait Navigator: Send + Sync {
    fn push(&self, route: &str);
}

/// Navigator backed by a watch channel holding the current route.
///
/// `push` and user navigation both publish the new route, so the
/// synchronizer observes either kind of change.
#[derive(Debug)]
pub struct ChannelNavigator {
    route: watch::Sender<String>,
}

impl ChannelNavigator {
    pub fn new(initial: impl Into<String>) -> Arc<Self> {
        let (route, _rx) = watch::channel(initial.into());
        Arc::new(Self { route })
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.route.subscribe()
    }

    pub fn current(&self) -> String {
        self.route.borrow().clone()
    }

    /// User-initiated navigation.
    pub fn navigate(&self, route: &str) {
        self.publish(route);
    }

    fn publish(&self, route: &str) {
        self.route.send_if_modified(|current| {
            if current == route {
                return false;
            }
            *current = route.to_string();
            true
        });
    }
}

impl Navigator for ChannelNavigator {
    fn push(&self, route: &str) {
        self.publish(route);
    }
}

/// The route to navigate to, if the current one is off the active step.
pub fn correction(active: Option<&Step>, current_route: &str) -> Option<&'static str> {
    active
        .map(|step| step.route)
        .filter(|&route| route != current_route)
}

pub struct NavigationSynchronizer {
    navigator: Arc<dyn Navigator>,
}

impl NavigationSynchronizer {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Push the active step's route if the current route differs. Returns
    /// the pushed route.
    pub fn reconcile(
        &self,
        snapshot: &OnboardingSnapshot,
        current_route: &str,
    ) -> Option<&'static str> {
        let target = correction(snapshot.active_step(), current_route)?;
        debug!(from = current_route, to = target, "Navigating to onboarding step");
        self.navigator.push(target);
        Some(target)
    }

    /// Re-run [`reconcile`](Self::reconcile) on every onboarding or route
    /// change until either channel closes.
    pub fn spawn(
        self,
        mut onboarding: watch::Receiver<OnboardingSnapshot>,
        mut routes: watch::Receiver<String>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let snapshot = onboarding.borrow_and_update().clone();
                let route = routes.borrow_and_update().clone();
                self.reconcile(&snapshot, &route);

                tokio::select! {
                    changed = onboarding.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = routes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("Navigation synchronizer stopped");
        })
    }
}
