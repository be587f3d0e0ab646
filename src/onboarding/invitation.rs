//! Decides what onboarding UI, if any, is on screen.

use serde::Serialize;

use crate::gate::GateSnapshot;

use super::state::OnboardingStatus;
use super::store::OnboardingSnapshot;

/// What the presentation layer should show. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Nothing,
    /// The one-time "start onboarding?" prompt. Closed only by start,
    /// postpone, or skip.
    Invitation,
    /// The step-by-step wizard.
    Wizard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvitationInputs {
    pub gate_satisfied: bool,
    pub gate_loading: bool,
    pub status: Option<OnboardingStatus>,
    pub status_loading: bool,
}

impl InvitationInputs {
    pub fn from_snapshots(gate: &GateSnapshot, onboarding: &OnboardingSnapshot) -> Self {
        Self {
            gate_satisfied: gate.is_satisfied(),
            gate_loading: gate.loading,
            status: onboarding.status,
            status_loading: onboarding.loading,
        }
    }
}

pub fn decide(inputs: InvitationInputs) -> Presentation {
    if inputs.gate_loading {
        return Presentation::Nothing;
    }
    match inputs.status {
        Some(OnboardingStatus::Pending) if inputs.gate_satisfied && !inputs.status_loading => {
            Presentation::Invitation
        }
        Some(OnboardingStatus::InProgress) => Presentation::Wizard,
        _ => Presentation::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(gate_satisfied: bool, status: Option<OnboardingStatus>) -> InvitationInputs {
        InvitationInputs {
            gate_satisfied,
            status,
            ..Default::default()
        }
    }

    #[test]
    fn pending_with_gate_shows_invitation() {
        assert_eq!(
            decide(inputs(true, Some(OnboardingStatus::Pending))),
            Presentation::Invitation
        );
    }

    #[test]
    fn in_progress_shows_wizard() {
        assert_eq!(
            decide(inputs(true, Some(OnboardingStatus::InProgress))),
            Presentation::Wizard
        );
    }

    #[test]
    fn unsatisfied_gate_shows_neither_invitation_nor_wizard_for_pending() {
        assert_eq!(
            decide(inputs(false, Some(OnboardingStatus::Pending))),
            Presentation::Nothing
        );
        assert_eq!(decide(inputs(false, None)), Presentation::Nothing);
    }

    #[test]
    fn loading_hides_everything() {
        for status in OnboardingStatus::ALL {
            let p = decide(InvitationInputs {
                gate_satisfied: true,
                gate_loading: true,
                status: Some(status),
                status_loading: false,
            });
            assert_eq!(p, Presentation::Nothing, "{status} while gate loads");
        }
        let p = decide(InvitationInputs {
            gate_satisfied: true,
            gate_loading: false,
            status: Some(OnboardingStatus::Pending),
            status_loading: true,
        });
        assert_eq!(p, Presentation::Nothing);
    }

    #[test]
    fn settled_statuses_show_nothing() {
        for status in [
            OnboardingStatus::Postponed,
            OnboardingStatus::Skipped,
            OnboardingStatus::Completed,
        ] {
            assert_eq!(decide(inputs(true, Some(status))), Presentation::Nothing);
        }
    }

    #[test]
    fn invitation_only_for_pending() {
        for gate_satisfied in [false, true] {
            for gate_loading in [false, true] {
                for status_loading in [false, true] {
                    for status in OnboardingStatus::ALL.map(Some).into_iter().chain([None]) {
                        let p = decide(InvitationInputs {
                            gate_satisfied,
                            gate_loading,
                            status,
                            status_loading,
                        });
                        if p == Presentation::Invitation {
                            assert_eq!(status, Some(OnboardingStatus::Pending));
                            assert!(gate_satisfied);
                        }
                        if p == Presentation::Wizard {
                            assert_eq!(status, Some(OnboardingStatus::InProgress));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn builds_from_snapshots() {
        let gate = GateSnapshot {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            loaded: true,
            ..Default::default()
        };
        let onboarding = OnboardingSnapshot {
            status: Some(OnboardingStatus::Pending),
            ..Default::default()
        };
        let inputs = InvitationInputs::from_snapshots(&gate, &onboarding);
        assert!(inputs.gate_satisfied);
        assert_eq!(decide(inputs), Presentation::Invitation);
    }
}
