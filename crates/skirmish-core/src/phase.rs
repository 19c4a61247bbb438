//! Combat phase contract.
//!
//! The phase driver belongs to the host (UI, headless simulator). The core
//! only defines the states, which changes are legal, and the callbacks a
//! driver reports through.
//!
//! ```text
//! Selection ──► Targeting ──► Execution ──► Selection
//!     │             │                 └────► End
//!     │             └──► Selection (cancel)
//!     └──────────────────► Execution
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encounter::RoundReport;
use crate::error::PhaseError;
use crate::targeting::TargetingStrategy;

/// Phase of the player-facing combat flow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    /// The player picks an ability.
    #[default]
    Selection,
    /// The player picks a primary target.
    Targeting,
    /// Queued actions resolve.
    Execution,
    /// The encounter is over.
    End,
}

impl CombatPhase {
    /// Returns `true` if moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Selection, Self::Targeting | Self::Execution)
                | (Self::Targeting, Self::Execution | Self::Selection)
                | (Self::Execution, Self::Selection | Self::End)
        )
    }

    /// Phase that follows selecting an ability with `strategy`.
    ///
    /// Strategies that need a primary target go through targeting.
    #[must_use]
    pub const fn after_selection(strategy: &TargetingStrategy) -> Self {
        if strategy.requires_target() {
            Self::Targeting
        } else {
            Self::Execution
        }
    }

    /// Returns `true` for the terminal phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::End)
    }

    /// Moves to `next`, notifying `listener`.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] if the change is not allowed; the listener is
    /// not called in that case.
    pub fn advance(
        self,
        next: Self,
        listener: &mut dyn PhaseListener,
    ) -> Result<Self, PhaseError> {
        if !self.can_transition_to(next) {
            return Err(PhaseError {
                from: self,
                to: next,
            });
        }
        listener.on_phase_changed(self, next);
        Ok(next)
    }
}

impl fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Selection => "selection",
            Self::Targeting => "targeting",
            Self::Execution => "execution",
            Self::End => "end",
        };
        f.write_str(label)
    }
}

/// Callbacks a phase driver reports through.
pub trait PhaseListener {
    /// Called after every legal phase change.
    fn on_phase_changed(&mut self, from: CombatPhase, to: CombatPhase);

    /// Called once a round has fully resolved.
    fn on_round_resolved(&mut self, _report: &RoundReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        changes: Vec<(CombatPhase, CombatPhase)>,
    }

    impl PhaseListener for Recorder {
        fn on_phase_changed(&mut self, from: CombatPhase, to: CombatPhase) {
            self.changes.push((from, to));
        }
    }

    #[test]
    fn legal_cycle() {
        use CombatPhase::{End, Execution, Selection, Targeting};
        assert!(Selection.can_transition_to(Targeting));
        assert!(Selection.can_transition_to(Execution));
        assert!(Targeting.can_transition_to(Execution));
        assert!(Targeting.can_transition_to(Selection));
        assert!(Execution.can_transition_to(Selection));
        assert!(Execution.can_transition_to(End));
    }

    #[test]
    fn illegal_moves() {
        use CombatPhase::{End, Execution, Selection, Targeting};
        assert!(!Selection.can_transition_to(End));
        assert!(!Execution.can_transition_to(Targeting));
        assert!(!End.can_transition_to(Selection));
        assert!(!Selection.can_transition_to(Selection));
    }

    #[test]
    fn selection_routes_by_strategy() {
        assert_eq!(
            CombatPhase::after_selection(&TargetingStrategy::SingleEnemy),
            CombatPhase::Targeting
        );
        assert_eq!(
            CombatPhase::after_selection(&TargetingStrategy::AllEnemies),
            CombatPhase::Execution
        );
        assert_eq!(
            CombatPhase::after_selection(&TargetingStrategy::SelfTarget),
            CombatPhase::Execution
        );
    }

    #[test]
    fn advance_notifies_only_on_success() {
        let mut recorder = Recorder::default();
        let phase = CombatPhase::Selection
            .advance(CombatPhase::Execution, &mut recorder)
            .unwrap();
        assert_eq!(phase, CombatPhase::Execution);

        let err = phase
            .advance(CombatPhase::Targeting, &mut recorder)
            .unwrap_err();
        assert_eq!(err.to_string(), "illegal phase transition execution -> targeting");
        assert_eq!(
            recorder.changes,
            vec![(CombatPhase::Selection, CombatPhase::Execution)]
        );
    }
}
