//! Action executor: validates, retargets, resolves and applies one action.
//!
//! The executor is the fault boundary of the pipeline. Whatever happens to a
//! single action (missing caster, dead caster, a faulting effect) is logged
//! and reported as an [`ActionOutcome`]; nothing propagates to the round loop.
//!
//! # Processing Order
//!
//! 1. No caster, no ability, caster without health, caster at zero health:
//!    skip with a warning
//! 2. Single-enemy actions whose primary is dead are retargeted to the
//!    healthiest active opposing combatant (first on ties), or lose their
//!    target when nobody is left
//! 3. The ability's targeting strategy resolves the final target list;
//!    combatants at zero health are left out of the candidate pools even
//!    when the roster still lists them as active
//! 4. The effect runs; an [`EffectError`] is logged and swallowed

use crate::ability::{self, EffectContext, EffectReport};
use crate::action::PendingAction;
use crate::combatant::CombatantId;
use crate::error::{EffectError, SkipReason};
use crate::log::LogSink;
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::stat::StatCache;
use crate::targeting::{Targeter, TargetingStrategy};
use crate::upgrade::UpgradeService;

/// What happened to one executed action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// A precondition failed; nothing was mutated.
    Skipped(SkipReason),
    /// The effect ran to completion.
    Executed {
        /// Primary target after retargeting.
        primary: Option<CombatantId>,
        /// Resolved target list, in strategy order.
        targets: Vec<CombatantId>,
        /// What the effect did.
        report: EffectReport,
    },
    /// The effect faulted; earlier mutations stand.
    Faulted(EffectError),
}

impl ActionOutcome {
    /// Returns `true` for [`ActionOutcome::Executed`].
    #[must_use]
    pub const fn is_executed(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }

    /// Resolved targets, empty unless executed.
    #[must_use]
    pub fn targets(&self) -> &[CombatantId] {
        match self {
            Self::Executed { targets, .. } => targets.as_slice(),
            _ => &[],
        }
    }

    /// Effect report, if executed.
    #[must_use]
    pub const fn report(&self) -> Option<&EffectReport> {
        match self {
            Self::Executed { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Runs queued actions one at a time.
///
/// Holds scratch buffers reused across calls; no state carries over between
/// actions.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use skirmish_core::ability::Ability;
/// use skirmish_core::action::PendingAction;
/// use skirmish_core::combatant::Faction;
/// use skirmish_core::executor::ActionExecutor;
/// use skirmish_core::log::LogSink;
/// use skirmish_core::rng::CombatRng;
/// use skirmish_core::roster::Roster;
/// use skirmish_core::stat::{Stat, StatCache};
/// use skirmish_core::targeting::TargetingStrategy;
/// use skirmish_core::upgrade::StatTable;
///
/// let mut roster = Roster::new();
/// let mut stats = StatCache::new();
/// let hero = roster.spawn("Hero", Faction::Player);
/// let orc = roster.spawn("Orc", Faction::Enemy);
/// stats.insert_health(hero, Box::new(Stat::health(100, 100)));
/// stats.insert_health(orc, Box::new(Stat::health(50, 50)));
///
/// let table = StatTable { critical_chance: 0.0, ..StatTable::default() };
/// let slash = Arc::new(Ability::direct_damage("Slash", 10, TargetingStrategy::SingleEnemy));
/// let action = PendingAction::new(slash, hero, Some(orc));
///
/// let mut executor = ActionExecutor::new();
/// let outcome = executor.execute(
///     &action,
///     &mut roster,
///     &mut stats,
///     Some(&table),
///     &mut CombatRng::new(7),
///     &mut LogSink::none(),
/// );
///
/// assert!(outcome.is_executed());
/// assert_eq!(stats.health_value(orc), Some(50 - table.direct_damage));
/// ```
#[derive(Debug, Default)]
pub struct ActionExecutor {
    targeter: Targeter,
    targets: Vec<CombatantId>,
    friendly: Vec<CombatantId>,
    hostile: Vec<CombatantId>,
}

impl ActionExecutor {
    /// Creates an executor with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes one action.
    ///
    /// # Arguments
    ///
    /// * `action` - The queued action; consumed logically, not retained
    /// * `roster` - Full roster, mutated when targets are defeated
    /// * `stats` - Health and action-point controllers
    /// * `upgrades` - Stat service; `None` selects the fallback table
    /// * `rng` - Random source for targeting and effect rolls
    /// * `log` - Presentation log
    pub fn execute(
        &mut self,
        action: &PendingAction,
        roster: &mut Roster,
        stats: &mut StatCache,
        upgrades: Option<&dyn UpgradeService>,
        rng: &mut CombatRng,
        log: &mut LogSink<'_>,
    ) -> ActionOutcome {
        let Some(caster) = action.caster else {
            return skip(SkipReason::NoCaster, action);
        };
        let Some(ability) = action.ability.as_deref() else {
            return skip(SkipReason::NoAbility, action);
        };
        let Some(health) = stats.health_value(caster) else {
            return skip(SkipReason::MissingHealth, action);
        };
        if health <= 0 {
            return skip(SkipReason::CasterDefeated, action);
        }

        let mut primary = action.target;
        if let (TargetingStrategy::SingleEnemy, Some(original)) = (ability.targeting(), primary) {
            let dead = stats.health_value(original).map_or(true, |hp| hp <= 0);
            if dead {
                primary = healthiest_opponent(caster, roster, stats);
                tracing::debug!(
                    %caster,
                    ability = ability.name(),
                    %original,
                    replacement = ?primary,
                    "primary target is down, retargeting"
                );
            }
        }
        let resolved = action.retargeted(primary);

        roster.partition_into(&mut self.friendly, &mut self.hostile);
        let standing = |id: &CombatantId| stats.health_value(*id).map_or(true, |hp| hp > 0);
        self.friendly.retain(standing);
        self.hostile.retain(standing);
        self.targets.clear();
        self.targeter.find_targets(
            &resolved,
            roster,
            &self.friendly,
            &self.hostile,
            rng,
            &mut self.targets,
        );

        tracing::debug!(
            %caster,
            ability = ability.name(),
            targets = self.targets.len(),
            "executing action"
        );

        let mut ctx = EffectContext {
            caster,
            primary,
            targets: &self.targets,
            roster,
            stats,
            upgrades,
            rng,
            log,
        };
        match ability::apply(ability, &mut ctx) {
            Ok(report) => ActionOutcome::Executed {
                primary,
                targets: self.targets.clone(),
                report,
            },
            Err(err) => {
                tracing::error!(
                    %caster,
                    ability = ability.name(),
                    targets = ?self.targets,
                    error = %err,
                    "ability effect faulted"
                );
                ActionOutcome::Faulted(err)
            }
        }
    }
}

fn skip(reason: SkipReason, action: &PendingAction) -> ActionOutcome {
    tracing::warn!(
        caster = ?action.caster,
        ability = action.ability_name().unwrap_or("<none>"),
        %reason,
        "skipping action"
    );
    ActionOutcome::Skipped(reason)
}

/// Active opposing combatant with the highest health above zero.
///
/// Ties keep the first in roster order.
fn healthiest_opponent(
    caster: CombatantId,
    roster: &Roster,
    stats: &StatCache,
) -> Option<CombatantId> {
    let side = roster.side(caster)?;
    let mut best: Option<(CombatantId, i32)> = None;
    for id in roster.active_on(side.opposing()) {
        let Some(hp) = stats.health_value(id).filter(|&hp| hp > 0) else {
            continue;
        };
        if best.map_or(true, |(_, top)| hp > top) {
            best = Some((id, hp));
        }
    }
    best.map(|(id, _)| id)
}
