//! Headless encounter runner.
//!
//! Loads a scenario file, pilots the player with the ally heuristic and
//! prints the combat log round by round.
//!
//! ```text
//! skirmish-sim --scenario demos/ambush.json --rounds 30 --seed 9
//! RUST_LOG=skirmish_core=debug skirmish-sim --scenario demos/siege.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use skirmish_core::action::PendingAction;
use skirmish_core::ai::{select_ability, select_target};
use skirmish_core::combatant::{CombatantId, Side};
use skirmish_core::config::ScenarioConfig;
use skirmish_core::encounter::{Encounter, Outcome, RoundReport};
use skirmish_core::log::{CombatLog, MemoryLog, NullLog};
use skirmish_core::phase::{CombatPhase, PhaseListener};
use skirmish_core::rng::CombatRng;
use skirmish_core::upgrade::StatTable;
use tracing_subscriber::EnvFilter;

/// Runs a scripted encounter to completion.
#[derive(Parser, Debug)]
#[command(name = "skirmish-sim")]
#[command(about = "Run a turn-based encounter from a scenario file", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario JSON file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Maximum number of rounds to play
    #[arg(short, long, default_value_t = 50)]
    rounds: u32,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON summary instead of the combat log
    #[arg(long)]
    json: bool,

    /// Debug-level tracing (ignored when RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,
}

/// Prints phase changes and round summaries.
struct Narrator {
    quiet: bool,
}

impl PhaseListener for Narrator {
    fn on_phase_changed(&mut self, from: CombatPhase, to: CombatPhase) {
        tracing::debug!(%from, %to, "phase changed");
    }

    fn on_round_resolved(&mut self, report: &RoundReport) {
        if !self.quiet {
            println!(
                "  -- round {}: {} executed, {} dropped, {}",
                report.round,
                report.executed(),
                report.dropped(),
                report.outcome
            );
        }
    }
}

#[derive(Serialize)]
struct CombatantSummary {
    id: u64,
    name: String,
    health: Option<i32>,
    action_points: Option<i32>,
    active: bool,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    rounds: u32,
    outcome: String,
    combatants: Vec<CombatantSummary>,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Chooses the player's action the way an ally brain would, paying the
/// scenario's reduced costs.
fn autopilot(
    encounter: &mut Encounter,
    table: &StatTable,
    pilot: &mut CombatRng,
) -> Option<PendingAction> {
    let player = encounter.player()?;
    let (name, target) = {
        let view = encounter.view();
        let enemies: Vec<CombatantId> = encounter.roster().active_on(Side::Hostile).collect();
        let target = select_target(encounter.player_last_action(), &enemies, &view, pilot)?;
        let ability = select_ability(
            encounter.loadout(player),
            view.action_points(player)?,
            table.ap_cost_reduction,
        )?;
        (ability.name().to_owned(), target)
    };
    match encounter.submit_player_action(&name, Some(target), Some(table)) {
        Ok(action) => Some(action),
        Err(err) => {
            tracing::warn!(%err, "player action rejected, passing");
            None
        }
    }
}

fn summarize(encounter: &Encounter) -> Summary {
    let view = encounter.view();
    let combatants = encounter
        .roster()
        .combatants_sorted()
        .map(|c| CombatantSummary {
            id: c.id().as_u64(),
            name: c.name().to_owned(),
            health: view.health(c.id()),
            action_points: view.action_points(c.id()),
            active: c.is_active(),
        })
        .collect();
    Summary {
        seed: encounter.seed(),
        rounds: encounter.round(),
        outcome: encounter.outcome().to_string(),
        combatants,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let scenario = ScenarioConfig::from_file(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    let table = scenario.stats.clone();
    let mut encounter = scenario
        .build_encounter(cli.seed)
        .context("scenario does not describe a playable encounter")?;

    tracing::info!(
        seed = encounter.seed(),
        combatants = encounter.roster().len(),
        "encounter ready"
    );

    let mut pilot = CombatRng::new(encounter.seed().rotate_left(17));
    let mut narrator = Narrator { quiet: cli.json };
    let mut log = MemoryLog::new();
    let mut discard = NullLog;
    let mut phase = CombatPhase::Selection;

    for _ in 0..cli.rounds {
        let action = autopilot(&mut encounter, &table, &mut pilot);
        let next = action
            .as_ref()
            .and_then(|a| a.ability.as_deref())
            .map_or(CombatPhase::Execution, |ability| {
                CombatPhase::after_selection(ability.targeting())
            });
        phase = phase.advance(next, &mut narrator)?;
        if phase == CombatPhase::Targeting {
            phase = phase.advance(CombatPhase::Execution, &mut narrator)?;
        }

        let sink: &mut dyn CombatLog = if cli.json { &mut discard } else { &mut log };
        let report = encounter.run_round(action, Some(&table), Some(sink));
        if !cli.json {
            for entry in log.drain() {
                println!("[{}] {}", entry.category, entry.message);
            }
        }
        narrator.on_round_resolved(&report);

        let next = if report.outcome.is_over() {
            CombatPhase::End
        } else {
            CombatPhase::Selection
        };
        phase = phase.advance(next, &mut narrator)?;
        if phase.is_terminal() {
            break;
        }
    }

    let summary = summarize(&encounter);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        match encounter.outcome() {
            Outcome::Ongoing => println!("Stopped after {} rounds, fight undecided", summary.rounds),
            outcome => println!("Finished in {} rounds: {outcome}", summary.rounds),
        }
        for c in &summary.combatants {
            println!(
                "  {:<12} hp {:>4}  ap {:>4}  {}",
                c.name,
                c.health.map_or_else(|| "-".to_owned(), |v| v.to_string()),
                c.action_points.map_or_else(|| "-".to_owned(), |v| v.to_string()),
                if c.active { "standing" } else { "down" }
            );
        }
    }
    Ok(())
}
