//! Encounter module with the round resolution loop.
//!
//! The `Encounter` owns everything one fight needs and resolves it one
//! round at a time:
//!
//! 1. **SUBMIT**: the host validates and pays for the player's action
//!    ([`Encounter::submit_player_action`])
//! 2. **PLAN**: every AI combatant picks and pays for its action
//! 3. **EXECUTE**: the player's action runs first, then the AI actions in
//!    roster order, each through the [`ActionExecutor`]
//! 4. **REPORT**: per-action outcomes and the encounter outcome are returned
//!
//! # Determinism
//!
//! All randomness comes from one [`CombatRng`] seeded at construction and
//! the roster iterates in insertion order, so the same seed and the same
//! player inputs replay the same fight.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use skirmish_core::ability::Ability;
//! use skirmish_core::combatant::Faction;
//! use skirmish_core::encounter::{CombatantSetup, Encounter, Outcome};
//! use skirmish_core::targeting::TargetingStrategy;
//!
//! let slash = Arc::new(Ability::direct_damage("Slash", 10, TargetingStrategy::SingleEnemy));
//!
//! let mut encounter = Encounter::new(42);
//! encounter.add_combatant(
//!     CombatantSetup::new("Hero", Faction::Player, 100)
//!         .with_action_points(50)
//!         .with_abilities(vec![Arc::clone(&slash)]),
//! );
//! let orc = encounter.add_combatant(CombatantSetup::new("Orc", Faction::Enemy, 15));
//!
//! let action = encounter.submit_player_action("Slash", Some(orc), None).unwrap();
//! let report = encounter.run_round(Some(action), None, None);
//!
//! assert_eq!(report.round, 1);
//! assert_eq!(report.outcome, Outcome::Victory);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::ability::Ability;
use crate::action::PendingAction;
use crate::ai::{brain_for, AiPlanner, BrainTable, PlanContext};
use crate::combatant::{CombatantId, Faction, Side};
use crate::error::SubmitError;
use crate::executor::{ActionExecutor, ActionOutcome};
use crate::log::{CombatLog, LogCategory, LogSink};
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::stat::{Stat, StatCache};
use crate::upgrade::UpgradeService;
use crate::view::BattleView;

// =============================================================================
// Setup
// =============================================================================

/// Everything needed to add one combatant.
#[derive(Debug, Clone)]
pub struct CombatantSetup {
    /// Display name.
    pub name: String,
    /// Faction.
    pub faction: Faction,
    /// Starting health.
    pub health: i32,
    /// Health ceiling.
    pub max_health: i32,
    /// Starting action points; `None` means no pool.
    pub action_points: Option<i32>,
    /// Optional action-point ceiling.
    pub ap_cap: Option<i32>,
    /// Known abilities.
    pub abilities: Vec<Arc<Ability>>,
}

impl CombatantSetup {
    /// Creates a setup at full health with no pool and no abilities.
    #[must_use]
    pub fn new(name: impl Into<String>, faction: Faction, health: i32) -> Self {
        Self {
            name: name.into(),
            faction,
            health,
            max_health: health,
            action_points: None,
            ap_cap: None,
            abilities: Vec::new(),
        }
    }

    /// Sets the health ceiling.
    #[must_use]
    pub const fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Gives the combatant an action-point pool.
    #[must_use]
    pub const fn with_action_points(mut self, points: i32) -> Self {
        self.action_points = Some(points);
        self
    }

    /// Caps the action-point pool.
    #[must_use]
    pub const fn with_ap_cap(mut self, cap: i32) -> Self {
        self.ap_cap = Some(cap);
        self
    }

    /// Sets the known abilities.
    #[must_use]
    pub fn with_abilities(mut self, abilities: Vec<Arc<Ability>>) -> Self {
        self.abilities = abilities;
        self
    }
}

// =============================================================================
// Reports
// =============================================================================

/// State of the encounter as a whole.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Both sides can still fight.
    Ongoing,
    /// No active enemy remains.
    Victory,
    /// The player or the whole friendly side is down.
    Defeat,
}

impl Outcome {
    /// Returns `true` once the encounter is decided.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => write!(f, "ongoing"),
            Self::Victory => write!(f, "victory"),
            Self::Defeat => write!(f, "defeat"),
        }
    }
}

/// One queued action and what became of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    /// Caster, if the action named one.
    pub caster: Option<CombatantId>,
    /// Ability name, if the action named one.
    pub ability: Option<String>,
    /// Executor result.
    pub outcome: ActionOutcome,
}

/// Result of [`Encounter::run_round`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: u32,
    /// Actions in execution order.
    pub actions: Vec<ActionRecord>,
    /// Encounter outcome after the round.
    pub outcome: Outcome,
}

impl RoundReport {
    /// Number of actions whose effect ran.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.actions
            .iter()
            .filter(|record| record.outcome.is_executed())
            .count()
    }

    /// Number of actions skipped or faulted.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.actions.len() - self.executed()
    }
}

// =============================================================================
// Encounter
// =============================================================================

/// One fight: roster, stat tables, brains and the round loop.
pub struct Encounter {
    roster: Roster,
    stats: StatCache,
    brains: BrainTable,
    loadouts: BTreeMap<CombatantId, Vec<Arc<Ability>>>,
    player: Option<CombatantId>,
    player_last_action: Option<PendingAction>,
    planner: AiPlanner,
    executor: ActionExecutor,
    queue: Vec<PendingAction>,
    rng: CombatRng,
    round: u32,
}

impl fmt::Debug for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encounter")
            .field("roster", &self.roster)
            .field("stats", &self.stats)
            .field("brains", &format!("[{} brains]", self.brains.len()))
            .field("player", &self.player)
            .field("round", &self.round)
            .field("seed", &self.rng.seed())
            .finish_non_exhaustive()
    }
}

impl Encounter {
    /// Creates an empty encounter.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed for every random roll in the fight
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            roster: Roster::new(),
            stats: StatCache::new(),
            brains: BrainTable::new(),
            loadouts: BTreeMap::new(),
            player: None,
            player_last_action: None,
            planner: AiPlanner::new(),
            executor: ActionExecutor::new(),
            queue: Vec::new(),
            rng: CombatRng::new(seed),
            round: 0,
        }
    }

    /// Adds a combatant, building its controllers and brain.
    ///
    /// A [`Faction::Player`] combatant becomes the player; adding a second
    /// one replaces the first as the player. A combatant added at zero
    /// health starts out defeated.
    pub fn add_combatant(&mut self, setup: CombatantSetup) -> CombatantId {
        let id = self.roster.spawn(setup.name, setup.faction);
        if setup.health <= 0 {
            self.roster.mark_defeated(id);
        }

        self.stats
            .insert_health(id, Box::new(Stat::health(setup.health, setup.max_health)));
        if let Some(points) = setup.action_points {
            let pool = match setup.ap_cap {
                Some(cap) => Stat::capped_action_points(points, cap),
                None => Stat::action_points(points),
            };
            self.stats.insert_action_points(id, Box::new(pool));
        }

        match brain_for(setup.faction, id, setup.abilities.clone()) {
            Some(brain) => {
                self.brains.insert(id, brain);
            }
            None => {
                if let Some(previous) = self.player.replace(id) {
                    tracing::warn!(%previous, player = %id, "replacing player");
                }
            }
        }
        self.loadouts.insert(id, setup.abilities);

        tracing::debug!(combatant = %id, faction = %setup.faction, "combatant added");
        id
    }

    /// The player, if one was added.
    #[must_use]
    pub const fn player(&self) -> Option<CombatantId> {
        self.player
    }

    /// Rounds resolved so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Seed the encounter was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Stat tables.
    #[must_use]
    pub const fn stats(&self) -> &StatCache {
        &self.stats
    }

    /// Mutable stat tables, e.g. for subscribing observers.
    pub fn stats_mut(&mut self) -> &mut StatCache {
        &mut self.stats
    }

    /// Read-only view for the current round.
    #[must_use]
    pub fn view(&self) -> BattleView<'_> {
        BattleView::new(&self.roster, &self.stats, self.round + 1)
    }

    /// Abilities a combatant knows.
    #[must_use]
    pub fn loadout(&self, id: CombatantId) -> &[Arc<Ability>] {
        self.loadouts
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Last action the player queued.
    #[must_use]
    pub const fn player_last_action(&self) -> Option<&PendingAction> {
        self.player_last_action.as_ref()
    }

    /// Validates the player's choice and pays for it.
    ///
    /// The effective cost is the ability cost minus the upgrade service's
    /// cost reduction, never below zero. Action points are deducted here.
    ///
    /// # Arguments
    ///
    /// * `ability` - Name of an ability in the player's loadout
    /// * `target` - Primary target; required by single- and random-enemy
    ///   strategies, and must be an active opponent when given
    /// * `upgrades` - Stat service for the cost reduction
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] describing the first failed check; no
    /// action points are spent in that case.
    pub fn submit_player_action(
        &mut self,
        ability: &str,
        target: Option<CombatantId>,
        upgrades: Option<&dyn UpgradeService>,
    ) -> Result<PendingAction, SubmitError> {
        let player = self.player.ok_or(SubmitError::NoPlayer)?;
        let alive = self.stats.health_value(player).is_some_and(|hp| hp > 0);
        if !self.roster.is_active(player) || !alive {
            return Err(SubmitError::PlayerInactive(player));
        }

        let chosen = self
            .loadout(player)
            .iter()
            .find(|known| known.name() == ability)
            .cloned()
            .ok_or_else(|| SubmitError::UnknownAbility(ability.to_owned()))?;

        if chosen.targeting().requires_target() && target.is_none() {
            return Err(SubmitError::TargetRequired(chosen.name().to_owned()));
        }
        if let Some(target) = target {
            let opposing = self.roster.side(player).map(Side::opposing);
            if !self.roster.is_active(target) || self.roster.side(target) != opposing {
                return Err(SubmitError::InvalidTarget(target));
            }
        }

        let reduction = upgrades.map_or(0, |service| service.ap_cost_reduction());
        let needed = chosen.effective_cost(reduction);
        let points = self
            .stats
            .action_points_mut(player)
            .ok_or(SubmitError::NoActionPoints)?;
        let available = points.current();
        if available < needed {
            return Err(SubmitError::InsufficientActionPoints { needed, available });
        }
        points.affect(-needed);

        tracing::debug!(
            %player,
            ability = chosen.name(),
            target = ?target,
            cost = needed,
            "player action submitted"
        );
        Ok(PendingAction::new(chosen, player, target))
    }

    /// Resolves one round.
    ///
    /// The player's action (if any) runs first, then every planned AI
    /// action in roster order. Running a round after the encounter is
    /// decided does nothing and reports the final outcome.
    ///
    /// # Arguments
    ///
    /// * `player_action` - Action returned by [`Self::submit_player_action`],
    ///   or `None` to pass
    /// * `upgrades` - Stat service; `None` selects the fallback table
    /// * `log` - Optional presentation log
    pub fn run_round(
        &mut self,
        player_action: Option<PendingAction>,
        upgrades: Option<&dyn UpgradeService>,
        log: Option<&mut dyn CombatLog>,
    ) -> RoundReport {
        let before = self.outcome();
        if before.is_over() {
            return RoundReport {
                round: self.round,
                actions: Vec::new(),
                outcome: before,
            };
        }

        self.round += 1;
        let mut sink = LogSink::new(log);
        sink.record(LogCategory::Info, format!("Round {}", self.round));

        self.queue.clear();
        if let Some(action) = player_action {
            self.player_last_action = Some(action.clone());
            self.queue.push(action);
        }

        let ctx = PlanContext {
            roster: &self.roster,
            player: self.player,
            player_action: self.player_last_action.as_ref(),
            round: self.round,
        };
        self.planner
            .plan_actions(&ctx, &self.brains, &mut self.stats, &mut self.rng, &mut self.queue);

        let mut actions = Vec::with_capacity(self.queue.len());
        for action in &self.queue {
            let outcome = self.executor.execute(
                action,
                &mut self.roster,
                &mut self.stats,
                upgrades,
                &mut self.rng,
                &mut sink,
            );
            actions.push(ActionRecord {
                caster: action.caster,
                ability: action.ability_name().map(str::to_owned),
                outcome,
            });
        }

        let outcome = self.outcome();
        match outcome {
            Outcome::Victory => sink.record(LogCategory::Info, "Victory!"),
            Outcome::Defeat => sink.record(LogCategory::Info, "Defeat..."),
            Outcome::Ongoing => {}
        }
        tracing::info!(
            round = self.round,
            actions = actions.len(),
            %outcome,
            "round resolved"
        );

        RoundReport {
            round: self.round,
            actions,
            outcome,
        }
    }

    /// Current encounter outcome.
    ///
    /// Defeat takes precedence: it is reported when the player is down
    /// (inactive or at zero health) or no friendly combatant is active.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        let standing = |id: CombatantId| {
            self.roster.is_active(id) && self.stats.health_value(id).is_some_and(|hp| hp > 0)
        };

        let player_down = self.player.is_some_and(|player| !standing(player));
        let friendly_left = self.roster.active_on(Side::Friendly).any(standing);
        if player_down || !friendly_left {
            return Outcome::Defeat;
        }
        if !self.roster.active_on(Side::Hostile).any(standing) {
            return Outcome::Victory;
        }
        Outcome::Ongoing
    }
}
