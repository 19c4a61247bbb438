//! Round planning for AI-controlled combatants.

use std::collections::BTreeMap;

use crate::action::PendingAction;
use crate::combatant::{CombatantId, Side};
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::stat::StatCache;
use crate::view::BattleView;

use super::Brain;

/// Brain side table keyed by combatant.
pub type BrainTable = BTreeMap<CombatantId, Box<dyn Brain>>;

/// Read-only inputs to [`AiPlanner::plan_actions`].
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    /// Every combatant in the encounter.
    pub roster: &'a Roster,
    /// The host-controlled combatant, never planned for.
    pub player: Option<CombatantId>,
    /// The player's action this round, for focus fire.
    pub player_action: Option<&'a PendingAction>,
    /// Current round number.
    pub round: u32,
}

/// Collects one action per eligible AI combatant.
///
/// Eligible means: not the player, active, and with both a brain and an
/// action-point pool. The planner only gates affordability and spends the
/// cost; it never resolves targets.
///
/// # Action Points
///
/// Cost is deducted here, at planning time. A combatant that is defeated
/// before its action executes has still paid for it.
#[derive(Debug, Default)]
pub struct AiPlanner {
    friendly: Vec<CombatantId>,
    hostile: Vec<CombatantId>,
}

impl AiPlanner {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans this round's AI actions, appending them to `out` in roster order.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Roster, player and round
    /// * `brains` - Brain per AI combatant
    /// * `stats` - Stat tables; action points are deducted in place
    /// * `rng` - Random source handed to the brains
    /// * `out` - Queue to append to
    ///
    /// # Returns
    ///
    /// The number of actions appended.
    pub fn plan_actions(
        &mut self,
        ctx: &PlanContext<'_>,
        brains: &BrainTable,
        stats: &mut StatCache,
        rng: &mut CombatRng,
        out: &mut Vec<PendingAction>,
    ) -> usize {
        let roster = ctx.roster;
        roster.partition_into(&mut self.friendly, &mut self.hostile);

        let mut planned = 0;
        for combatant in roster.combatants_sorted() {
            let id = combatant.id();
            if Some(id) == ctx.player || !combatant.is_active() {
                continue;
            }
            if stats.health_value(id).is_some_and(|hp| hp <= 0) {
                tracing::debug!(combatant = %id, "combatant is down, not planning");
                continue;
            }
            let Some(brain) = brains.get(&id) else {
                continue;
            };
            if stats.action_points(id).is_none() {
                continue;
            }

            let (enemies, allies) = match combatant.side() {
                Side::Friendly => (&self.hostile, &self.friendly),
                Side::Hostile => (&self.friendly, &self.hostile),
            };
            let view = BattleView::new(roster, stats, ctx.round);
            let action = brain.choose_action(ctx.player_action, enemies, allies, &view, rng);

            let Some(cost) = action.ability.as_deref().map(|ability| ability.cost()) else {
                tracing::debug!(combatant = %id, "brain passed");
                continue;
            };
            let Some(points) = stats.action_points_mut(id) else {
                continue;
            };
            let available = points.current();
            if available < cost {
                tracing::debug!(combatant = %id, cost, available, "action unaffordable, dropped");
                continue;
            }

            points.affect(-cost);
            tracing::debug!(
                combatant = %id,
                ability = action.ability_name().unwrap_or_default(),
                cost,
                remaining = available - cost,
                "action planned"
            );
            out.push(action);
            planned += 1;
        }
        planned
    }
}
