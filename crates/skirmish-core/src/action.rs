//! Pending actions: queued, not-yet-resolved ability uses.

use std::sync::Arc;

use crate::ability::Ability;
use crate::combatant::CombatantId;

/// An ability use waiting for the executor.
///
/// Every component is optional. A brain with nothing to do returns
/// [`PendingAction::pass`]; the executor skips incomplete actions instead
/// of failing. The primary target is only meaningful for strategies that
/// [require one](crate::targeting::TargetingStrategy::requires_target).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use skirmish_core::ability::Ability;
/// use skirmish_core::action::PendingAction;
/// use skirmish_core::combatant::CombatantId;
/// use skirmish_core::targeting::TargetingStrategy;
///
/// let slash = Arc::new(Ability::direct_damage("Slash", 20, TargetingStrategy::SingleEnemy));
/// let action = PendingAction::new(slash, CombatantId::new(0), Some(CombatantId::new(1)));
///
/// assert!(!action.is_pass());
/// assert_eq!(action.ability_name(), Some("Slash"));
/// assert!(PendingAction::pass().is_pass());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingAction {
    /// Ability to use.
    pub ability: Option<Arc<Ability>>,
    /// Combatant using it.
    pub caster: Option<CombatantId>,
    /// Primary target, if any.
    pub target: Option<CombatantId>,
}

impl PendingAction {
    /// Creates a complete action.
    #[must_use]
    pub fn new(ability: Arc<Ability>, caster: CombatantId, target: Option<CombatantId>) -> Self {
        Self {
            ability: Some(ability),
            caster: Some(caster),
            target,
        }
    }

    /// The "do nothing this round" action.
    #[must_use]
    pub fn pass() -> Self {
        Self::default()
    }

    /// Returns `true` if there is no ability to use.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.ability.is_none()
    }

    /// Name of the ability, if any.
    #[must_use]
    pub fn ability_name(&self) -> Option<&str> {
        self.ability.as_deref().map(Ability::name)
    }

    /// Returns a copy of this action aimed at a different primary target.
    #[must_use]
    pub fn retargeted(&self, target: Option<CombatantId>) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}
