//! End-to-end tests of the round pipeline.

use std::sync::{Arc, Mutex};

use crate::action::PendingAction;
use crate::combatant::Faction;
use crate::encounter::{CombatantSetup, Encounter, Outcome, RoundReport};
use crate::error::{EffectError, SkipReason};
use crate::executor::ActionOutcome;
use crate::log::{LogCategory, MemoryLog};
use crate::phase::{CombatPhase, PhaseListener};
use crate::rng::CombatRng;
use crate::stat::{StatChange, StatKind};
use crate::upgrade::StatTable;

use super::helpers::{
    autopilot, calm_table, execute, firestorm, focus, play_round, slash, standard_encounter,
    volley,
};

// =============================================================================
// Full Fights
// =============================================================================

#[test]
fn autopilot_fight_reaches_a_decision() {
    let (mut encounter, party) = standard_encounter(2024);
    let table = StatTable::default();
    let mut pilot = CombatRng::new(99);
    let mut log = MemoryLog::new();

    let mut last = None;
    for _ in 0..200 {
        let report = play_round(&mut encounter, &table, &mut pilot, Some(&mut log));
        let over = report.outcome.is_over();
        last = Some(report);
        if over {
            break;
        }
    }

    let outcome = last.map(|report| report.outcome);
    assert!(matches!(outcome, Some(Outcome::Victory | Outcome::Defeat)));
    assert!(log.count(LogCategory::Death) >= 1);
    if outcome == Some(Outcome::Victory) {
        for &orc in &party.enemies {
            assert!(!encounter.view().is_active(orc));
        }
    }
}

#[test]
fn action_points_never_go_negative() {
    let (mut encounter, _) = standard_encounter(5);
    let table = StatTable::default();
    let mut pilot = CombatRng::new(5);

    for _ in 0..40 {
        let report = play_round(&mut encounter, &table, &mut pilot, None);
        let view = encounter.view();
        for id in encounter.roster().ids_sorted() {
            if let Some(points) = view.action_points(id) {
                assert!(points >= 0, "{id} has {points} AP");
            }
        }
        if report.outcome.is_over() {
            break;
        }
    }
}

#[test]
fn health_never_leaves_bounds() {
    let (mut encounter, _) = standard_encounter(17);
    let table = StatTable {
        critical_chance: 0.5,
        ..StatTable::default()
    };
    let mut pilot = CombatRng::new(3);

    for _ in 0..40 {
        let report = play_round(&mut encounter, &table, &mut pilot, None);
        let view = encounter.view();
        for id in encounter.roster().ids_sorted() {
            let hp = view.health(id).unwrap();
            let max = view.max_health(id).unwrap();
            assert!((0..=max).contains(&hp));
            if hp == 0 {
                assert!(!view.is_active(id));
            }
        }
        if report.outcome.is_over() {
            break;
        }
    }
}

// =============================================================================
// Pipeline Behavior
// =============================================================================

#[test]
fn stale_player_target_is_retargeted() {
    let (mut encounter, party) = standard_encounter(8);
    let table = calm_table();
    let [weak, strong, other] = [party.enemies[0], party.enemies[1], party.enemies[2]];
    encounter.stats_mut().health_mut(other).unwrap().set(40);

    let action = encounter
        .submit_player_action("Slash", Some(weak), Some(&table))
        .unwrap();
    // health drops to zero after submission, before execution
    encounter.stats_mut().health_mut(weak).unwrap().set(0);

    let report = encounter.run_round(Some(action), Some(&table), None);
    let first = &report.actions[0].outcome;
    assert_eq!(first.targets(), &[strong]);
    assert_eq!(first.report().unwrap().damage_to(strong), table.direct_damage);
    assert_eq!(first.report().unwrap().damage_to(other), 0);
}

#[test]
fn faulting_action_does_not_stop_the_round() {
    let (mut encounter, party) = standard_encounter(3);
    let drone = encounter.add_combatant(CombatantSetup::new("Drone", Faction::Ally, 30));
    let table = calm_table();
    let bogus = PendingAction::new(focus(), drone, None);

    let report = encounter.run_round(Some(bogus), Some(&table), None);

    assert_eq!(
        report.actions[0].outcome,
        ActionOutcome::Faulted(EffectError::MissingController {
            target: drone,
            kind: StatKind::ActionPoints
        })
    );
    // squire and all three orcs still act
    assert_eq!(report.actions.len(), 5);
    assert!(report.actions[1..].iter().all(|r| r.outcome.is_executed()));
    let view = encounter.view();
    let friendly_hurt = view.health(party.hero) < Some(100) || view.health(party.squire) < Some(70);
    assert!(friendly_hurt);
}

#[test]
fn malformed_actions_are_skipped_quietly() {
    let (mut encounter, party) = standard_encounter(3);
    let headless = PendingAction {
        ability: Some(slash()),
        caster: None,
        target: Some(party.enemies[0]),
    };

    let report = encounter.run_round(Some(headless), Some(&calm_table()), None);
    assert_eq!(
        report.actions[0].outcome,
        ActionOutcome::Skipped(SkipReason::NoCaster)
    );
    assert_eq!(report.dropped(), 1);
}

#[test]
fn firestorm_hits_everyone_and_splashes() {
    let (mut encounter, party) = standard_encounter(12);
    let table = StatTable {
        critical_chance: 1.0,
        ..calm_table()
    };
    encounter.stats_mut().action_points_mut(party.hero).unwrap().set(45);

    let action = encounter
        .submit_player_action("Firestorm", Some(party.enemies[1]), Some(&table))
        .unwrap();
    let report = encounter.run_round(Some(action), Some(&table), None);
    let effect = report.actions[0].outcome.report().unwrap();

    for &orc in &party.enemies {
        let direct: Vec<_> = effect
            .hits
            .iter()
            .filter(|hit| hit.target == orc && !hit.splash)
            .collect();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].amount, table.area_damage * 2);
    }
    let splash = effect.splash().unwrap();
    assert_eq!(splash.amount, table.area_damage / 2);
    assert_ne!(splash.target, party.enemies[1]);
}

#[test]
fn volley_hits_primary_plus_share() {
    let (mut encounter, party) = standard_encounter(21);
    let table = calm_table();
    let action = encounter
        .submit_player_action("Volley", Some(party.enemies[2]), Some(&table))
        .unwrap();
    let report = encounter.run_round(Some(action), Some(&table), None);

    // ceil(3 * 0.5) = 2 targets, the primary always among them
    let targets = report.actions[0].outcome.targets();
    assert_eq!(targets.len(), 2);
    assert!(targets.contains(&party.enemies[2]));
}

#[test]
fn execute_can_whiff() {
    let (mut encounter, party) = standard_encounter(4);
    let table = StatTable {
        miss_chance: 1.0,
        ..calm_table()
    };
    let mut log = MemoryLog::new();
    let action = encounter
        .submit_player_action("Execute", Some(party.enemies[0]), Some(&table))
        .unwrap();
    let report = encounter.run_round(Some(action), Some(&table), Some(&mut log));

    assert!(report.actions[0].outcome.report().unwrap().missed);
    assert_eq!(log.count(LogCategory::Miss), 1);
    assert_eq!(encounter.stats().action_point_value(party.hero), Some(10));
}

#[test]
fn autopilot_spends_with_the_cost_reduction() {
    let (mut encounter, party) = standard_encounter(31);
    let table = StatTable {
        ap_cost_reduction: 15,
        ..calm_table()
    };
    encounter.stats_mut().action_points_mut(party.hero).unwrap().set(40);
    let mut pilot = CombatRng::new(1);

    // Execute costs 50, 35 after the reduction: the priciest move within 40
    let action = autopilot(&mut encounter, &table, &mut pilot).unwrap();
    assert_eq!(action.ability_name(), Some("Execute"));
    assert_eq!(encounter.stats().action_point_value(party.hero), Some(5));
}

#[test]
fn dead_ai_keeps_its_spent_points() {
    let mut encounter = Encounter::new(6);
    encounter.add_combatant(
        CombatantSetup::new("Hero", Faction::Player, 100)
            .with_action_points(100)
            .with_abilities(vec![execute()]),
    );
    let orc = encounter.add_combatant(
        CombatantSetup::new("Orc", Faction::Enemy, 30)
            .with_action_points(25)
            .with_abilities(vec![slash()]),
    );
    let table = calm_table();
    let action = encounter
        .submit_player_action("Execute", Some(orc), Some(&table))
        .unwrap();

    let report = encounter.run_round(Some(action), Some(&table), None);
    assert_eq!(report.outcome, Outcome::Victory);
    assert_eq!(
        report.actions[1].outcome,
        ActionOutcome::Skipped(SkipReason::CasterDefeated)
    );
    assert_eq!(encounter.stats().action_point_value(orc), Some(5));
}

#[test]
fn resource_gain_refills_broke_combatants() {
    let (mut encounter, party) = standard_encounter(10);
    for &orc in &party.enemies {
        encounter.stats_mut().action_points_mut(orc).unwrap().set(0);
    }
    let table = calm_table();
    encounter.run_round(None, Some(&table), None);

    for &orc in &party.enemies {
        assert_eq!(
            encounter.stats().action_point_value(orc),
            Some(table.ap_gain)
        );
    }
}

// =============================================================================
// Observers and Phases
// =============================================================================

#[test]
fn stat_observers_see_damage() {
    let (mut encounter, party) = standard_encounter(1);
    let seen: Arc<Mutex<Vec<StatChange>>> = Arc::default();
    let sink = Arc::clone(&seen);
    encounter
        .stats_mut()
        .health_mut(party.hero)
        .unwrap()
        .subscribe(Box::new(move |change: &StatChange| {
            sink.lock().unwrap().push(*change);
        }));

    encounter.run_round(None, Some(&calm_table()), None);

    let changes = seen.lock().unwrap();
    let hero_hp = encounter.view().health(party.hero).unwrap();
    if hero_hp < 100 {
        assert!(!changes.is_empty());
        assert!(changes.iter().all(|c| c.kind == StatKind::Health && c.delta() < 0));
        assert_eq!(changes.last().unwrap().current, hero_hp);
    } else {
        assert!(changes.is_empty());
    }
}

#[derive(Default)]
struct PhaseRecorder {
    phases: Vec<CombatPhase>,
    rounds: Vec<u32>,
}

impl PhaseListener for PhaseRecorder {
    fn on_phase_changed(&mut self, _from: CombatPhase, to: CombatPhase) {
        self.phases.push(to);
    }

    fn on_round_resolved(&mut self, report: &RoundReport) {
        self.rounds.push(report.round);
    }
}

#[test]
fn host_drives_phases_around_rounds() {
    let (mut encounter, party) = standard_encounter(77);
    let table = calm_table();
    let mut recorder = PhaseRecorder::default();
    let mut phase = CombatPhase::Selection;

    for _ in 0..2 {
        let ability = slash();
        phase = phase
            .advance(CombatPhase::after_selection(ability.targeting()), &mut recorder)
            .unwrap();
        if phase == CombatPhase::Targeting {
            phase = phase.advance(CombatPhase::Execution, &mut recorder).unwrap();
        }
        let action = encounter
            .submit_player_action(ability.name(), Some(party.enemies[0]), Some(&table))
            .unwrap();
        let report = encounter.run_round(Some(action), Some(&table), None);
        recorder.on_round_resolved(&report);
        let next = if report.outcome.is_over() {
            CombatPhase::End
        } else {
            CombatPhase::Selection
        };
        phase = phase.advance(next, &mut recorder).unwrap();
    }

    assert_eq!(recorder.rounds, vec![1, 2]);
    assert_eq!(
        recorder.phases,
        vec![
            CombatPhase::Targeting,
            CombatPhase::Execution,
            CombatPhase::Selection,
            CombatPhase::Targeting,
            CombatPhase::Execution,
            CombatPhase::Selection,
        ]
    );
    assert_eq!(phase, CombatPhase::Selection);
}

#[test]
fn firestorm_needs_no_targeting_phase() {
    let ability = firestorm();
    assert_eq!(
        CombatPhase::after_selection(ability.targeting()),
        CombatPhase::Execution
    );
    assert_eq!(
        CombatPhase::after_selection(volley().targeting()),
        CombatPhase::Targeting
    );
}
