//! Guided onboarding.
//!
//! The store persists status transitions and owns the step cursor. The
//! invitation policy and the navigation synchronizer read its snapshots.

pub mod invitation;
pub mod navigation;
pub mod state;
pub mod steps;
pub mod store;

pub use invitation::{InvitationInputs, Presentation, decide};
pub use navigation::{ChannelNavigator, NavigationSynchronizer, Navigator};
pub use state::{DeviceType, OnboardingEvent, OnboardingStatus};
pub use steps::{STEPS, Step, StepKey, StepProgress};
pub use store::{OnboardingSnapshot, OnboardingStore};
