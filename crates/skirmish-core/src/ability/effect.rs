//! Effect routines: how abilities mutate their resolved targets.
//!
//! [`apply`] is the single entry point. It receives the already-resolved
//! target list and mutates the stat controllers directly, one target at a
//! time, in target-list order. There is no transaction: if a fault stops
//! the routine half way, the targets already processed keep their changes.
//!
//! # Death
//!
//! A target whose health reaches zero is marked defeated in the roster
//! (making it inactive for every later targeting query) and a
//! [`LogCategory::Death`] entry is recorded once.

use crate::combatant::CombatantId;
use crate::error::EffectError;
use crate::log::{LogCategory, LogSink};
use crate::rng::CombatRng;
use crate::roster::Roster;
use crate::stat::{StatCache, StatKind};
use crate::upgrade::{EffectStats, UpgradeService};

use super::{Ability, EffectKind};

/// Everything an effect routine may read or mutate.
pub struct EffectContext<'a, 'log> {
    /// Combatant using the ability.
    pub caster: CombatantId,
    /// Primary target after retargeting, if any.
    pub primary: Option<CombatantId>,
    /// Resolved targets, in strategy output order.
    pub targets: &'a [CombatantId],
    /// Full roster (splash lookups, death bookkeeping).
    pub roster: &'a mut Roster,
    /// Health and AP controllers.
    pub stats: &'a mut StatCache,
    /// Upgrade service; `None` selects the fallback table.
    pub upgrades: Option<&'a dyn UpgradeService>,
    /// Random source.
    pub rng: &'a mut CombatRng,
    /// Presentation log.
    pub log: &'a mut LogSink<'log>,
}

/// One damage application.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Combatant hit.
    pub target: CombatantId,
    /// Damage dealt (before clamping to the remaining health).
    pub amount: i32,
    /// `true` if the critical roll succeeded.
    pub critical: bool,
    /// `true` for area splash.
    pub splash: bool,
}

/// What an effect invocation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectReport {
    /// `true` if a special attack missed.
    pub missed: bool,
    /// Damage applications, in order.
    pub hits: Vec<Hit>,
    /// Action points granted per target.
    pub ap_gains: Vec<(CombatantId, i32)>,
    /// Combatants defeated by this effect.
    pub defeated: Vec<CombatantId>,
}

impl EffectReport {
    /// Total damage dealt, splash included.
    #[must_use]
    pub fn total_damage(&self) -> i32 {
        self.hits.iter().map(|hit| hit.amount).sum()
    }

    /// Damage dealt to one combatant.
    #[must_use]
    pub fn damage_to(&self, target: CombatantId) -> i32 {
        self.hits
            .iter()
            .filter(|hit| hit.target == target)
            .map(|hit| hit.amount)
            .sum()
    }

    /// The splash hit, if one happened.
    #[must_use]
    pub fn splash(&self) -> Option<&Hit> {
        self.hits.iter().find(|hit| hit.splash)
    }
}

/// Applies `ability`'s effect to the resolved targets in `ctx`.
///
/// # Errors
///
/// - [`EffectError::InvalidStat`] if the upgrade service reports an invalid value
/// - [`EffectError::MissingController`] if a resolved target lacks the stat
///   the effect mutates; targets before it keep their changes
pub fn apply(ability: &Ability, ctx: &mut EffectContext<'_, '_>) -> Result<EffectReport, EffectError> {
    let values = EffectStats::resolve(ability.ability_type(), ctx.upgrades)?;
    let mut report = EffectReport::default();

    match ability.effect() {
        EffectKind::DirectDamage => damage_all(ability, &values, ctx, &mut report)?,
        EffectKind::AreaDamage => {
            damage_all(ability, &values, ctx, &mut report)?;
            splash(ability, &values, ctx, &mut report)?;
        }
        EffectKind::SpecialAttack => {
            if !ctx.targets.is_empty() && ctx.rng.chance(values.miss_chance) {
                report.missed = true;
                ctx.log.record(
                    LogCategory::Miss,
                    format!("{}'s {} misses", ctx.roster.name(ctx.caster), ability.name()),
                );
                tracing::debug!(caster = %ctx.caster, ability = ability.name(), "special attack missed");
                return Ok(report);
            }
            damage_all(ability, &values, ctx, &mut report)?;
        }
        EffectKind::GainResource => gain_resource(&values, ctx, &mut report)?,
    }

    Ok(report)
}

fn damage_all(
    ability: &Ability,
    values: &EffectStats,
    ctx: &mut EffectContext<'_, '_>,
    report: &mut EffectReport,
) -> Result<(), EffectError> {
    for &target in ctx.targets {
        let critical = ctx.rng.chance(values.critical_chance);
        let amount = if critical {
            values.damage.saturating_mul(2)
        } else {
            values.damage
        };
        strike(ability, ctx, target, amount, critical, false, report)?;
    }
    Ok(())
}

fn splash(
    ability: &Ability,
    values: &EffectStats,
    ctx: &mut EffectContext<'_, '_>,
    report: &mut EffectReport,
) -> Result<(), EffectError> {
    let Some(primary) = ctx.primary.or_else(|| ctx.targets.first().copied()) else {
        return Ok(());
    };
    let Some(faction) = ctx.roster.faction(primary) else {
        return Ok(());
    };

    let caster = ctx.caster;
    let stats = &*ctx.stats;
    let bystanders: Vec<CombatantId> = ctx
        .roster
        .combatants_sorted()
        .filter(|c| c.faction() == faction && c.is_active())
        .map(|c| c.id())
        .filter(|&id| id != primary && id != caster)
        .filter(|&id| stats.health_value(id).is_some_and(|hp| hp > 0))
        .collect();

    let Some(victim) = ctx.rng.pick(&bystanders) else {
        return Ok(());
    };
    strike(ability, ctx, victim, values.damage / 2, false, true, report)
}

fn strike(
    ability: &Ability,
    ctx: &mut EffectContext<'_, '_>,
    target: CombatantId,
    amount: i32,
    critical: bool,
    splash: bool,
    report: &mut EffectReport,
) -> Result<(), EffectError> {
    let health = ctx
        .stats
        .health_mut(target)
        .ok_or(EffectError::MissingController {
            target,
            kind: StatKind::Health,
        })?;
    health.affect(-amount);
    let remaining = health.current();

    let name = ctx.roster.name(target);
    let (category, message) = if critical {
        (
            LogCategory::Critical,
            format!("Critical! {name} takes {amount} damage from {}", ability.name()),
        )
    } else if splash {
        (
            LogCategory::Damage,
            format!("{name} is caught in the blast for {amount} damage"),
        )
    } else {
        (
            LogCategory::Damage,
            format!("{name} takes {amount} damage from {}", ability.name()),
        )
    };
    ctx.log.record(category, message);
    tracing::debug!(
        %target,
        amount,
        critical,
        splash,
        remaining,
        ability = ability.name(),
        "damage applied"
    );

    report.hits.push(Hit {
        target,
        amount,
        critical,
        splash,
    });

    if remaining <= 0 && ctx.roster.mark_defeated(target) {
        ctx.log.record(
            LogCategory::Death,
            format!("{} is defeated", ctx.roster.name(target)),
        );
        tracing::info!(%target, "combatant defeated");
        report.defeated.push(target);
    }
    Ok(())
}

fn gain_resource(
    values: &EffectStats,
    ctx: &mut EffectContext<'_, '_>,
    report: &mut EffectReport,
) -> Result<(), EffectError> {
    for &target in ctx.targets {
        let points = ctx
            .stats
            .action_points_mut(target)
            .ok_or(EffectError::MissingController {
                target,
                kind: StatKind::ActionPoints,
            })?;
        points.affect(values.ap_gain);
        let now = points.current();

        ctx.log.record(
            LogCategory::ActionPoints,
            format!(
                "{} gains {} action points ({now})",
                ctx.roster.name(target),
                values.ap_gain
            ),
        );
        report.ap_gains.push((target, values.ap_gain));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Faction;
    use crate::log::MemoryLog;
    use crate::stat::Stat;
    use crate::targeting::TargetingStrategy;
    use crate::upgrade::StatTable;

    struct Scene {
        roster: Roster,
        stats: StatCache,
        caster: CombatantId,
        enemies: Vec<CombatantId>,
    }

    impl Scene {
        fn new(enemy_health: &[i32]) -> Self {
            let mut roster = Roster::new();
            let mut stats = StatCache::new();
            let caster = roster.spawn("Hero", Faction::Player);
            stats.insert_health(caster, Box::new(Stat::health(100, 100)));
            stats.insert_action_points(caster, Box::new(Stat::action_points(0)));
            let enemies = enemy_health
                .iter()
                .enumerate()
                .map(|(i, &hp)| {
                    let id = roster.spawn(format!("Orc {i}"), Faction::Enemy);
                    stats.insert_health(id, Box::new(Stat::health(hp, 100)));
                    id
                })
                .collect();
            Self {
                roster,
                stats,
                caster,
                enemies,
            }
        }

        fn run(
            &mut self,
            ability: &Ability,
            primary: Option<CombatantId>,
            targets: &[CombatantId],
            table: &StatTable,
            seed: u64,
            log: &mut MemoryLog,
        ) -> Result<EffectReport, EffectError> {
            let mut rng = CombatRng::new(seed);
            let mut sink = LogSink::new(Some(log));
            let mut ctx = EffectContext {
                caster: self.caster,
                primary,
                targets,
                roster: &mut self.roster,
                stats: &mut self.stats,
                upgrades: Some(table),
                rng: &mut rng,
                log: &mut sink,
            };
            apply(ability, &mut ctx)
        }

        fn hp(&self, id: CombatantId) -> i32 {
            self.stats.health_value(id).unwrap()
        }
    }

    fn table(crit: f64, miss: f64) -> StatTable {
        StatTable {
            direct_damage: 10,
            area_damage: 8,
            special_damage: 30,
            critical_chance: crit,
            miss_chance: miss,
            ap_gain: 25,
            ap_cost_reduction: 0,
        }
    }

    mod direct_damage_tests {
        use super::*;

        #[test]
        fn damages_each_target() {
            let mut scene = Scene::new(&[50, 50]);
            let ability = Ability::direct_damage("Slash", 10, TargetingStrategy::AllEnemies);
            let targets = scene.enemies.clone();
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, None, &targets, &table(0.0, 0.0), 1, &mut log)
                .unwrap();

            assert_eq!(scene.hp(targets[0]), 40);
            assert_eq!(scene.hp(targets[1]), 40);
            assert_eq!(report.total_damage(), 20);
            assert_eq!(log.count(LogCategory::Damage), 2);
        }

        #[test]
        fn certain_critical_doubles() {
            let mut scene = Scene::new(&[50]);
            let ability = Ability::direct_damage("Slash", 10, TargetingStrategy::SingleEnemy);
            let targets = scene.enemies.clone();
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, Some(targets[0]), &targets, &table(1.0, 0.0), 1, &mut log)
                .unwrap();

            assert_eq!(scene.hp(targets[0]), 30);
            assert!(report.hits[0].critical);
            assert_eq!(log.count(LogCategory::Critical), 1);
        }

        #[test]
        fn critical_rolls_are_per_target() {
            let mut mixed_actions = 0;
            for seed in 0..20 {
                let mut scene = Scene::new(&[100; 8]);
                let ability = Ability::direct_damage("Sweep", 10, TargetingStrategy::AllEnemies);
                let targets = scene.enemies.clone();
                let report = scene
                    .run(&ability, None, &targets, &table(0.5, 0.0), seed, &mut MemoryLog::new())
                    .unwrap();

                assert_eq!(report.hits.len(), 8);
                for hit in &report.hits {
                    assert_eq!(hit.amount, if hit.critical { 20 } else { 10 });
                }
                let crits = report.hits.iter().filter(|hit| hit.critical).count();
                if crits > 0 && crits < report.hits.len() {
                    mixed_actions += 1;
                }
            }
            assert!(mixed_actions > 0);
        }

        #[test]
        fn lethal_damage_defeats_once() {
            let mut scene = Scene::new(&[5]);
            let ability = Ability::direct_damage("Slash", 10, TargetingStrategy::SingleEnemy);
            let targets = vec![scene.enemies[0], scene.enemies[0]];
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, None, &targets, &table(0.0, 0.0), 1, &mut log)
                .unwrap();

            assert_eq!(scene.hp(targets[0]), 0);
            assert!(!scene.roster.is_active(targets[0]));
            assert_eq!(report.defeated, vec![targets[0]]);
            assert_eq!(log.count(LogCategory::Death), 1);
        }

        #[test]
        fn missing_health_controller_faults_after_earlier_targets() {
            let mut scene = Scene::new(&[50]);
            let ghost = scene.roster.spawn("Ghost", Faction::Enemy);
            let ability = Ability::direct_damage("Slash", 10, TargetingStrategy::AllEnemies);
            let targets = vec![scene.enemies[0], ghost];
            let mut log = MemoryLog::new();
            let err = scene
                .run(&ability, None, &targets, &table(0.0, 0.0), 1, &mut log)
                .unwrap_err();

            assert_eq!(
                err,
                EffectError::MissingController {
                    target: ghost,
                    kind: StatKind::Health
                }
            );
            assert_eq!(scene.hp(scene.enemies[0]), 40);
        }

        #[test]
        fn invalid_upgrade_value_faults_before_any_mutation() {
            let mut scene = Scene::new(&[50]);
            let ability = Ability::direct_damage("Slash", 10, TargetingStrategy::SingleEnemy);
            let targets = scene.enemies.clone();
            let mut log = MemoryLog::new();
            let result = scene.run(&ability, None, &targets, &table(2.0, 0.0), 1, &mut log);

            assert!(matches!(result, Err(EffectError::InvalidStat { .. })));
            assert_eq!(scene.hp(targets[0]), 50);
        }
    }

    mod area_damage_tests {
        use super::*;

        #[test]
        fn criticals_double_each_target_and_splash_takes_half_base() {
            let mut scene = Scene::new(&[100, 100, 100, 100]);
            let ability = Ability::area_damage("Firestorm", 30, TargetingStrategy::AllEnemies);
            let targets: Vec<_> = scene.enemies[..3].to_vec();
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, Some(targets[0]), &targets, &table(1.0, 0.0), 4, &mut log)
                .unwrap();

            for &target in &targets {
                let primary_hit = report
                    .hits
                    .iter()
                    .find(|h| h.target == target && !h.splash)
                    .unwrap();
                assert!(primary_hit.critical);
                assert_eq!(primary_hit.amount, 16);
            }
            let splash = report.splash().unwrap();
            assert_eq!(splash.amount, 4);
            assert!(!splash.critical);
            assert_ne!(splash.target, targets[0]);
            assert_ne!(splash.target, scene.caster);
        }

        #[test]
        fn splash_never_hits_primary_or_caster() {
            for seed in 0..30 {
                let mut scene = Scene::new(&[100, 100]);
                let ability = Ability::area_damage("Firestorm", 30, TargetingStrategy::SingleEnemy);
                let primary = scene.enemies[0];
                let mut log = MemoryLog::new();
                let report = scene
                    .run(&ability, Some(primary), &[primary], &table(0.0, 0.0), seed, &mut log)
                    .unwrap();

                let splash = report.splash().unwrap();
                assert_eq!(splash.target, scene.enemies[1]);
                assert_eq!(scene.hp(scene.enemies[1]), 96);
            }
        }

        #[test]
        fn no_bystander_no_splash() {
            let mut scene = Scene::new(&[100]);
            let ability = Ability::area_damage("Firestorm", 30, TargetingStrategy::SingleEnemy);
            let primary = scene.enemies[0];
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, Some(primary), &[primary], &table(0.0, 0.0), 1, &mut log)
                .unwrap();
            assert!(report.splash().is_none());
        }

        #[test]
        fn defeated_bystanders_are_skipped() {
            let mut scene = Scene::new(&[100, 100, 0]);
            scene.roster.mark_defeated(scene.enemies[1]);
            let ability = Ability::area_damage("Firestorm", 30, TargetingStrategy::SingleEnemy);
            let primary = scene.enemies[0];
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, Some(primary), &[primary], &table(0.0, 0.0), 1, &mut log)
                .unwrap();
            // enemies[1] is inactive, enemies[2] has no health left
            assert!(report.splash().is_none());
        }
    }

    mod special_attack_tests {
        use super::*;

        #[test]
        fn certain_miss_cancels_everything() {
            let mut scene = Scene::new(&[100, 100]);
            let ability = Ability::special_attack("Execute", 60, TargetingStrategy::AllEnemies);
            let targets = scene.enemies.clone();
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, None, &targets, &table(1.0, 1.0), 1, &mut log)
                .unwrap();

            assert!(report.missed);
            assert!(report.hits.is_empty());
            assert_eq!(scene.hp(targets[0]), 100);
            assert_eq!(log.count(LogCategory::Miss), 1);
        }

        #[test]
        fn hit_uses_special_damage_without_splash() {
            let mut scene = Scene::new(&[100, 100]);
            let ability = Ability::special_attack("Execute", 60, TargetingStrategy::SingleEnemy);
            let primary = scene.enemies[0];
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, Some(primary), &[primary], &table(0.0, 0.0), 1, &mut log)
                .unwrap();

            assert!(!report.missed);
            assert_eq!(scene.hp(primary), 70);
            assert_eq!(scene.hp(scene.enemies[1]), 100);
        }
    }

    mod gain_resource_tests {
        use super::*;

        #[test]
        fn grants_flat_points() {
            let mut scene = Scene::new(&[100]);
            let ability = Ability::gain_resource("Focus", 0, TargetingStrategy::SelfTarget);
            let caster = scene.caster;
            let mut log = MemoryLog::new();
            let report = scene
                .run(&ability, None, &[caster], &table(0.0, 0.0), 1, &mut log)
                .unwrap();

            assert_eq!(scene.stats.action_point_value(caster), Some(25));
            assert_eq!(report.ap_gains, vec![(caster, 25)]);
            assert_eq!(log.count(LogCategory::ActionPoints), 1);
        }

        #[test]
        fn target_without_pool_faults() {
            let mut scene = Scene::new(&[100]);
            let ability = Ability::gain_resource("Focus", 0, TargetingStrategy::SelfTarget);
            let orc = scene.enemies[0];
            let mut log = MemoryLog::new();
            let err = scene
                .run(&ability, None, &[orc], &table(0.0, 0.0), 1, &mut log)
                .unwrap_err();
            assert_eq!(
                err,
                EffectError::MissingController {
                    target: orc,
                    kind: StatKind::ActionPoints
                }
            );
        }
    }
}
