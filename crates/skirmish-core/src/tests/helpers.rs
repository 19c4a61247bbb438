//! Test helper functions for setting up encounters and driving rounds.

use std::sync::Arc;

use crate::ability::Ability;
use crate::action::PendingAction;
use crate::ai::{select_ability, select_target};
use crate::combatant::{CombatantId, Faction, Side};
use crate::encounter::{CombatantSetup, Encounter, RoundReport};
use crate::log::CombatLog;
use crate::rng::CombatRng;
use crate::targeting::TargetingStrategy;
use crate::upgrade::StatTable;

// =============================================================================
// Abilities
// =============================================================================

/// 20 AP single-target strike.
pub fn slash() -> Arc<Ability> {
    Arc::new(Ability::direct_damage("Slash", 20, TargetingStrategy::SingleEnemy))
}

/// 35 AP area strike hitting half the opposing side.
pub fn volley() -> Arc<Ability> {
    Arc::new(Ability::area_damage(
        "Volley",
        35,
        TargetingStrategy::RandomEnemies {
            target_percentage: 0.5,
        },
    ))
}

/// 45 AP area strike hitting everyone opposing.
pub fn firestorm() -> Arc<Ability> {
    Arc::new(Ability::area_damage("Firestorm", 45, TargetingStrategy::AllEnemies))
}

/// 50 AP special attack.
pub fn execute() -> Arc<Ability> {
    Arc::new(Ability::special_attack("Execute", 50, TargetingStrategy::SingleEnemy))
}

/// Free self-targeted action-point gain.
pub fn focus() -> Arc<Ability> {
    Arc::new(Ability::gain_resource("Focus", 0, TargetingStrategy::SelfTarget))
}

/// Stat table with no criticals and no misses.
pub fn calm_table() -> StatTable {
    StatTable {
        critical_chance: 0.0,
        miss_chance: 0.0,
        ..StatTable::default()
    }
}

// =============================================================================
// Encounter Setup
// =============================================================================

/// Handles of the standard party.
#[derive(Debug, Clone)]
pub struct Party {
    /// The player.
    pub hero: CombatantId,
    /// The player's ally.
    pub squire: CombatantId,
    /// Enemies in roster order.
    pub enemies: Vec<CombatantId>,
}

/// Sets up hero + squire against three orcs.
///
/// - Hero: 100 HP, 60 AP, every ability
/// - Squire: 70 HP, 40 AP, Slash and Focus
/// - Orcs: 60 HP, 30 AP, Slash and Focus
pub fn standard_encounter(seed: u64) -> (Encounter, Party) {
    let mut encounter = Encounter::new(seed);
    let hero = encounter.add_combatant(
        CombatantSetup::new("Hero", Faction::Player, 100)
            .with_action_points(60)
            .with_abilities(vec![slash(), volley(), firestorm(), execute(), focus()]),
    );
    let squire = encounter.add_combatant(
        CombatantSetup::new("Squire", Faction::Ally, 70)
            .with_action_points(40)
            .with_abilities(vec![slash(), focus()]),
    );
    let enemies = (0..3)
        .map(|i| {
            encounter.add_combatant(
                CombatantSetup::new(format!("Orc {i}"), Faction::Enemy, 60)
                    .with_action_points(30)
                    .with_abilities(vec![slash(), focus()]),
            )
        })
        .collect();
    (
        encounter,
        Party {
            hero,
            squire,
            enemies,
        },
    )
}

/// Observable state of every combatant: (id, health, action points, active).
pub fn snapshot(encounter: &Encounter) -> Vec<(CombatantId, Option<i32>, Option<i32>, bool)> {
    let view = encounter.view();
    encounter
        .roster()
        .ids_sorted()
        .map(|id| (id, view.health(id), view.action_points(id), view.is_active(id)))
        .collect()
}

// =============================================================================
// Driving Rounds
// =============================================================================

/// Picks and submits the player's action with the ally heuristic.
///
/// Affordability and payment both use the table's cost reduction. Returns
/// `None` (pass) when nothing sensible can be submitted.
pub fn autopilot(
    encounter: &mut Encounter,
    table: &StatTable,
    rng: &mut CombatRng,
) -> Option<PendingAction> {
    let player = encounter.player()?;
    let (name, target) = {
        let view = encounter.view();
        let enemies: Vec<CombatantId> = encounter.roster().active_on(Side::Hostile).collect();
        let target = select_target(encounter.player_last_action(), &enemies, &view, rng)?;
        let ability = select_ability(
            encounter.loadout(player),
            view.action_points(player)?,
            table.ap_cost_reduction,
        )?;
        (ability.name().to_owned(), target)
    };
    encounter.submit_player_action(&name, Some(target), Some(table)).ok()
}

/// Runs one autopilot round.
pub fn play_round(
    encounter: &mut Encounter,
    table: &StatTable,
    pilot: &mut CombatRng,
    log: Option<&mut dyn CombatLog>,
) -> RoundReport {
    let action = autopilot(encounter, table, pilot);
    encounter.run_round(action, Some(table), log)
}
