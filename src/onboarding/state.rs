//! Onboarding state machine. The backend owns the status; the events here
//! decide which status a user action moves it to.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Onboarding status as stored by the backend, one per (user, device type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStatus {
    Pending,
    InProgress,
    Postponed,
    Skipped,
    Completed,
}

impl OnboardingStatus {
    pub const ALL: [OnboardingStatus; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Postponed,
        Self::Skipped,
        Self::Completed,
    ];

    /// The status reached by applying `event`, or `None` when there is no
    /// such edge.
    ///
    /// ```text
    /// PENDING     --start-->    IN_PROGRESS
    /// PENDING     --postpone--> POSTPONED
    /// PENDING     --skip-->     SKIPPED
    /// IN_PROGRESS --complete--> COMPLETED
    /// IN_PROGRESS --postpone--> POSTPONED
    /// IN_PROGRESS --skip-->     SKIPPED
    /// ```
    pub fn apply(&self, event: OnboardingEvent) -> Option<OnboardingStatus> {
        use OnboardingEvent as E;
        use OnboardingStatus::*;
        match (self, event) {
            (Pending, E::Start) => Some(InProgress),
            (Pending | InProgress, E::Postpone) => Some(Postponed),
            (Pending | InProgress, E::Skip) => Some(Skipped),
            (InProgress, E::Complete) => Some(Completed),
            _ => None,
        }
    }

    /// Whether no exposed event leads out of this status.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Postponed | Self::Skipped | Self::Completed)
    }
}

impl std::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Postponed => "POSTPONED",
            Self::Skipped => "SKIPPED",
            Self::Completed => "COMPLETED",
        };
        write!(f, "{s}")
    }
}

/// Client platform the onboarding progress is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    #[default]
    Web,
    Mobile,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "WEB",
            Self::Mobile => "MOBILE",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEB" => Ok(Self::Web),
            "MOBILE" => Ok(Self::Mobile),
            other => Err(format!("unknown device type '{other}', expected WEB or MOBILE")),
        }
    }
}

/// Client-initiated onboarding events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingEvent {
    Start,
    Postpone,
    Skip,
    Complete,
}

impl std::fmt::Display for OnboardingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Postpone => "postpone",
            Self::Skip => "skip",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}
