//! Per-combatant decision makers.
//!
//! Ally and enemy brains run the same selection algorithm; they differ only
//! in which side they stand on, which the planner resolves before calling
//! them. The algorithm:
//!
//! 1. Candidates are the active `enemies` with health above zero. None
//!    means pass.
//! 2. The candidates tied at the lowest current health form the tie set.
//! 3. A single tied candidate is the target. Otherwise, if the opponent's
//!    last action aimed at a member of the tie set, that member is chosen
//!    (focus fire); failing that, a uniformly random member.
//! 4. Among the owner's abilities, the affordable one with the strictly
//!    highest cost wins (first listed on ties). Nothing affordable means pass.

use std::sync::Arc;

use crate::ability::Ability;
use crate::action::PendingAction;
use crate::combatant::{CombatantId, Faction};
use crate::rng::CombatRng;
use crate::view::BattleView;

/// Chooses one action per round for a non-player combatant.
pub trait Brain: Send + Sync {
    /// Combatant this brain controls.
    fn owner(&self) -> CombatantId;

    /// Abilities the owner knows, in priority order for cost ties.
    fn abilities(&self) -> &[Arc<Ability>];

    /// Picks this round's action.
    ///
    /// # Arguments
    ///
    /// * `opponent_action` - Last action submitted by the opposing side's
    ///   leader, used for focus fire
    /// * `enemies` - Roster the owner fights against
    /// * `allies` - Roster the owner fights alongside
    /// * `view` - Read-only battle state
    /// * `rng` - Random source for tie-breaking
    ///
    /// # Returns
    ///
    /// A complete action, or [`PendingAction::pass`] when there is no
    /// target or nothing is affordable.
    fn choose_action(
        &self,
        opponent_action: Option<&PendingAction>,
        enemies: &[CombatantId],
        allies: &[CombatantId],
        view: &BattleView<'_>,
        rng: &mut CombatRng,
    ) -> PendingAction;
}

// =============================================================================
// Shared selection
// =============================================================================

/// Picks the weakest active opponent, honouring focus fire on ties.
///
/// Returns `None` when no active opponent has health above zero.
pub fn select_target(
    opponent_action: Option<&PendingAction>,
    enemies: &[CombatantId],
    view: &BattleView<'_>,
    rng: &mut CombatRng,
) -> Option<CombatantId> {
    let candidates: Vec<(CombatantId, i32)> = enemies
        .iter()
        .copied()
        .filter(|&id| view.is_active(id))
        .filter_map(|id| view.health(id).filter(|&hp| hp > 0).map(|hp| (id, hp)))
        .collect();

    let lowest = candidates.iter().map(|&(_, hp)| hp).min()?;
    let tied: Vec<CombatantId> = candidates
        .iter()
        .filter(|&&(_, hp)| hp == lowest)
        .map(|&(id, _)| id)
        .collect();

    if let [only] = tied.as_slice() {
        return Some(*only);
    }

    let focus = opponent_action
        .and_then(|action| action.target)
        .filter(|target| tied.contains(target));
    focus.or_else(|| rng.pick(&tied))
}

/// Picks the most expensive ability affordable with `action_points`.
///
/// Costs are compared after `cost_reduction` (see
/// [`Ability::effective_cost`]); AI brains pay full price and pass `0`.
/// Ties on cost keep the first listed ability.
#[must_use]
pub fn select_ability(
    abilities: &[Arc<Ability>],
    action_points: i32,
    cost_reduction: i32,
) -> Option<&Arc<Ability>> {
    let mut best: Option<(&Arc<Ability>, i32)> = None;
    for ability in abilities {
        let cost = ability.effective_cost(cost_reduction);
        if cost > action_points {
            continue;
        }
        if best.map_or(true, |(_, top)| cost > top) {
            best = Some((ability, cost));
        }
    }
    best.map(|(ability, _)| ability)
}

fn decide(
    owner: CombatantId,
    abilities: &[Arc<Ability>],
    opponent_action: Option<&PendingAction>,
    enemies: &[CombatantId],
    view: &BattleView<'_>,
    rng: &mut CombatRng,
) -> PendingAction {
    let Some(target) = select_target(opponent_action, enemies, view, rng) else {
        tracing::debug!(%owner, "no target available, passing");
        return PendingAction::pass();
    };

    let Some(action_points) = view.action_points(owner) else {
        tracing::debug!(%owner, "no action point pool, passing");
        return PendingAction::pass();
    };

    match select_ability(abilities, action_points, 0) {
        Some(ability) => PendingAction::new(Arc::clone(ability), owner, Some(target)),
        None => {
            tracing::debug!(%owner, action_points, "nothing affordable, passing");
            PendingAction::pass()
        }
    }
}

// =============================================================================
// Faction brains
// =============================================================================

/// Brain for combatants fighting on the player's side.
#[derive(Debug, Clone)]
pub struct AllyBrain {
    owner: CombatantId,
    abilities: Vec<Arc<Ability>>,
}

impl AllyBrain {
    /// Creates a brain for `owner` with its known abilities.
    #[must_use]
    pub fn new(owner: CombatantId, abilities: Vec<Arc<Ability>>) -> Self {
        Self { owner, abilities }
    }
}

impl Brain for AllyBrain {
    fn owner(&self) -> CombatantId {
        self.owner
    }

    fn abilities(&self) -> &[Arc<Ability>] {
        &self.abilities
    }

    fn choose_action(
        &self,
        opponent_action: Option<&PendingAction>,
        enemies: &[CombatantId],
        _allies: &[CombatantId],
        view: &BattleView<'_>,
        rng: &mut CombatRng,
    ) -> PendingAction {
        decide(self.owner, &self.abilities, opponent_action, enemies, view, rng)
    }
}

/// Brain for enemy combatants.
#[derive(Debug, Clone)]
pub struct EnemyBrain {
    owner: CombatantId,
    abilities: Vec<Arc<Ability>>,
}

impl EnemyBrain {
    /// Creates a brain for `owner` with its known abilities.
    #[must_use]
    pub fn new(owner: CombatantId, abilities: Vec<Arc<Ability>>) -> Self {
        Self { owner, abilities }
    }
}

impl Brain for EnemyBrain {
    fn owner(&self) -> CombatantId {
        self.owner
    }

    fn abilities(&self) -> &[Arc<Ability>] {
        &self.abilities
    }

    fn choose_action(
        &self,
        opponent_action: Option<&PendingAction>,
        enemies: &[CombatantId],
        _allies: &[CombatantId],
        view: &BattleView<'_>,
        rng: &mut CombatRng,
    ) -> PendingAction {
        decide(self.owner, &self.abilities, opponent_action, enemies, view, rng)
    }
}

/// Creates the brain matching a faction.
///
/// The player is driven by the host, so [`Faction::Player`] yields `None`.
#[must_use]
pub fn brain_for(
    faction: Faction,
    owner: CombatantId,
    abilities: Vec<Arc<Ability>>,
) -> Option<Box<dyn Brain>> {
    match faction {
        Faction::Player => None,
        Faction::Ally => Some(Box::new(AllyBrain::new(owner, abilities))),
        Faction::Enemy => Some(Box::new(EnemyBrain::new(owner, abilities))),
    }
}
