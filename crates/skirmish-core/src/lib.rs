//! # Skirmish Core
//!
//! Action decision and resolution pipeline for turn-based tactical combat.
//!
//! Each round the player submits one action, every AI combatant plans one,
//! and the queue resolves deterministically: caster validation, retargeting
//! of dead primaries, target expansion, and effect application (damage,
//! splash, criticals, misses, resource gain).
//!
//! ## Architecture
//!
//! - **Roster**: arena of combatants keyed by monotonic [`CombatantId`]
//! - **Side tables**: health and action-point controllers ([`stat::StatCache`]),
//!   brains ([`ai::BrainTable`])
//! - **Planning**: [`ai::AiPlanner`] asks each [`ai::Brain`] for a
//!   [`PendingAction`] and spends its cost
//! - **Execution**: [`executor::ActionExecutor`] resolves one action at a time
//!   and contains every fault
//! - **Driver**: [`encounter::Encounter`] runs the round loop; the host owns
//!   the [`phase::CombatPhase`] flow
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::config::ScenarioConfig;
//! use skirmish_core::log::MemoryLog;
//!
//! let scenario = ScenarioConfig::from_json(r#"{
//!     "abilities": [
//!         { "name": "Slash", "cost": 10, "effect": "direct_damage",
//!           "targeting": { "kind": "single_enemy" } }
//!     ],
//!     "combatants": [
//!         { "name": "Hero", "faction": "player", "health": 50,
//!           "action_points": 30, "abilities": ["Slash"] },
//!         { "name": "Rat", "faction": "enemy", "health": 5 }
//!     ]
//! }"#).unwrap();
//!
//! let mut encounter = scenario.build_encounter(None).unwrap();
//! let rat = encounter.roster().ids_sorted().nth(1).unwrap();
//! let action = encounter.submit_player_action("Slash", Some(rat), None).unwrap();
//!
//! let mut log = MemoryLog::new();
//! let report = encounter.run_round(Some(action), Some(&scenario.stats), Some(&mut log));
//! assert!(report.outcome.is_over());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ability;
pub mod action;
pub mod ai;
pub mod combatant;
pub mod config;
pub mod encounter;
pub mod error;
pub mod executor;
pub mod log;
pub mod phase;
pub mod rng;
pub mod roster;
pub mod stat;
pub mod targeting;
pub mod upgrade;
pub mod view;

#[cfg(test)]
mod tests;

pub use ability::{Ability, AbilityType, EffectKind};
pub use action::PendingAction;
pub use combatant::{Combatant, CombatantId, Faction, Side};
pub use encounter::{CombatantSetup, Encounter, Outcome, RoundReport};
pub use error::{ConfigError, EffectError, PhaseError, SkipReason, SubmitError};
pub use executor::{ActionExecutor, ActionOutcome};
pub use phase::{CombatPhase, PhaseListener};
pub use roster::Roster;
pub use targeting::TargetingStrategy;
pub use upgrade::{StatTable, UpgradeService};
