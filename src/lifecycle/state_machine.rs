// Stage transition table - either a transition is legal and yields the next
// stage, or the call fails with InvalidState and nothing is written.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::lifecycle::types::Stage;

/// Events that can move a project between stages. Brief submission and
/// rejection are intentionally absent: neither touches the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Owner approved the onboarding brief.
    BriefApproved,
    /// Staff started build work after design.
    BuildStarted,
    /// Staff submitted build output for client review.
    ReviewRequested,
    /// Owner sent a delivered-for-review project back to build.
    ModificationRequested,
    /// Owner signed off on the delivery.
    DeliveryValidated,
}

impl Stage {
    /// Apply a lifecycle event, returning the next stage. Illegal pairs fail
    /// with `InvalidState` so the caller writes nothing.
    pub fn apply(self, event: LifecycleEvent) -> Result<Stage, EngineError> {
        use LifecycleEvent::*;

        let next = match (self, event) {
            (Stage::Onboarding, BriefApproved) => Stage::Design,
            (Stage::Design, BuildStarted) => Stage::Build,
            (Stage::Build, ReviewRequested) => Stage::Review,
            // The one permitted cycle: review work can go back to build.
            (Stage::Review, ModificationRequested) => Stage::Build,
            (Stage::Review, DeliveryValidated) => Stage::Delivered,
            (stage, event) => {
                return Err(EngineError::invalid_state(format!(
                    "event {event:?} is not valid in stage {stage}"
                )));
            }
        };
        Ok(next)
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_flow_is_ordered() {
        let stage = Stage::Onboarding;
        let stage = stage.apply(LifecycleEvent::BriefApproved).unwrap();
        assert_eq!(stage, Stage::Design);
        let stage = stage.apply(LifecycleEvent::BuildStarted).unwrap();
        assert_eq!(stage, Stage::Build);
        let stage = stage.apply(LifecycleEvent::ReviewRequested).unwrap();
        assert_eq!(stage, Stage::Review);
        let stage = stage.apply(LifecycleEvent::DeliveryValidated).unwrap();
        assert_eq!(stage, Stage::Delivered);
        assert!(stage.is_terminal());
    }

    #[test]
    fn review_build_cycle_is_permitted() {
        let stage = Stage::Review
            .apply(LifecycleEvent::ModificationRequested)
            .unwrap();
        assert_eq!(stage, Stage::Build);
        let stage = stage.apply(LifecycleEvent::ReviewRequested).unwrap();
        assert_eq!(stage, Stage::Review);
    }

    #[test]
    fn delivered_is_terminal() {
        for event in [
            LifecycleEvent::BriefApproved,
            LifecycleEvent::BuildStarted,
            LifecycleEvent::ReviewRequested,
            LifecycleEvent::ModificationRequested,
            LifecycleEvent::DeliveryValidated,
        ] {
            let result = Stage::Delivered.apply(event);
            assert!(matches!(result, Err(EngineError::InvalidState { .. })));
        }
    }

    #[test]
    fn approval_only_moves_onboarding() {
        for stage in [Stage::Design, Stage::Build, Stage::Review] {
            let result = stage.apply(LifecycleEvent::BriefApproved);
            assert!(matches!(result, Err(EngineError::InvalidState { .. })));
        }
    }

    #[test]
    fn skipping_stages_is_rejected() {
        assert!(Stage::Onboarding
            .apply(LifecycleEvent::DeliveryValidated)
            .is_err());
        assert!(Stage::Design
            .apply(LifecycleEvent::ReviewRequested)
            .is_err());
        assert!(Stage::Build
            .apply(LifecycleEvent::ModificationRequested)
            .is_err());
    }
}
