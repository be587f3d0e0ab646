//! The fixed, ordered list of onboarding steps and saturating cursor
//! movement over it.

use serde::{Deserialize, Serialize};

use super::state::OnboardingStatus;

/// Identifier of one onboarding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Intro,
    Assets,
    Categories,
    Counterparties,
    Transactions,
    Limits,
    Planning,
    Reports,
}

impl std::fmt::Display for StepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Intro => "intro",
            Self::Assets => "assets",
            Self::Categories => "categories",
            Self::Counterparties => "counterparties",
            Self::Transactions => "transactions",
            Self::Limits => "limits",
            Self::Planning => "planning",
            Self::Reports => "reports",
        };
        write!(f, "{s}")
    }
}

/// One routed stage of the onboarding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub key: StepKey,
    pub route: &'static str,
}

pub const STEP_COUNT: usize = 8;

/// All steps, in the order the wizard walks them.
pub static STEPS: [Step; STEP_COUNT] = [
    Step { key: StepKey::Intro, route: "/dashboard" },
    Step { key: StepKey::Assets, route: "/assets" },
    Step { key: StepKey::Categories, route: "/categories" },
    Step { key: StepKey::Counterparties, route: "/counterparties" },
    Step { key: StepKey::Transactions, route: "/transactions" },
    Step { key: StepKey::Limits, route: "/limits" },
    Step { key: StepKey::Planning, route: "/financial-planning" },
    Step { key: StepKey::Reports, route: "/reports" },
];

/// Index of the final step.
pub const LAST_INDEX: usize = STEP_COUNT - 1;

/// The step shown to the user, only while onboarding is in progress.
pub fn active_step(status: Option<OnboardingStatus>, cursor: usize) -> Option<&'static Step> {
    match status {
        Some(OnboardingStatus::InProgress) => STEPS.get(cursor),
        _ => None,
    }
}

/// Move forward one step, stopping at the last one.
pub fn advance(cursor: usize) -> usize {
    cursor.saturating_add(1).min(LAST_INDEX)
}

/// Move back one step, stopping at the first one.
pub fn retreat(cursor: usize) -> usize {
    cursor.saturating_sub(1).min(LAST_INDEX)
}

pub fn is_last(cursor: usize) -> bool {
    cursor >= LAST_INDEX
}

/// "Step N of M" data for the wizard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    /// 1-based.
    pub position: usize,
    pub total: usize,
    pub is_first: bool,
    pub is_last: bool,
}

pub fn progress(cursor: usize) -> StepProgress {
    let cursor = cursor.min(LAST_INDEX);
    StepProgress {
        position: cursor + 1,
        total: STEP_COUNT,
        is_first: cursor == 0,
        is_last: is_last(cursor),
    }
}
