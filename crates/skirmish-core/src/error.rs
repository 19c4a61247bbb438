//! Error types for the pipeline.
//!
//! - [`EffectError`]: a fault inside an ability effect. Caught and logged at
//!   the executor boundary, never propagated to the round loop.
//! - [`SkipReason`]: why the executor dropped an action without running it.
//! - [`SubmitError`]: the player's chosen action was rejected before queuing.
//! - [`PhaseError`]: an illegal combat phase change.
//! - [`ConfigError`]: a scenario or ability catalog failed to load.

use thiserror::Error;

use crate::combatant::CombatantId;
use crate::phase::CombatPhase;
use crate::stat::StatKind;

/// Fault raised while applying an ability effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    /// A resolved target has no controller for the stat the effect mutates.
    #[error("{target} has no {kind} controller")]
    MissingController {
        /// Target that could not be affected.
        target: CombatantId,
        /// Stat the effect tried to mutate.
        kind: StatKind,
    },

    /// The upgrade service returned a value outside its valid range.
    #[error("upgrade service returned invalid {stat}: {value}")]
    InvalidStat {
        /// Name of the offending value.
        stat: &'static str,
        /// Value as reported.
        value: f64,
    },
}

/// Precondition that stopped the executor before targeting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The action names no caster.
    #[error("action has no caster")]
    NoCaster,

    /// The action names no ability.
    #[error("action has no ability")]
    NoAbility,

    /// The caster has no health controller.
    #[error("caster has no health controller")]
    MissingHealth,

    /// The caster's health is zero or below.
    #[error("caster is defeated")]
    CasterDefeated,
}

/// Rejection of a player-submitted action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The encounter has no player combatant.
    #[error("encounter has no player")]
    NoPlayer,

    /// The player cannot act (defeated or disabled).
    #[error("player {0} cannot act")]
    PlayerInactive(CombatantId),

    /// The named ability is not in the player's loadout.
    #[error("unknown ability: {0}")]
    UnknownAbility(String),

    /// The player lacks the action points for the ability.
    #[error("not enough action points: need {needed}, have {available}")]
    InsufficientActionPoints {
        /// Effective cost after upgrades.
        needed: i32,
        /// Points currently available.
        available: i32,
    },

    /// The player has no action-point controller.
    #[error("player has no action point pool")]
    NoActionPoints,

    /// The ability needs a primary target and none was given.
    #[error("ability {0} requires a target")]
    TargetRequired(String),

    /// The given target is not an active member of the opposing side.
    #[error("invalid target {0}")]
    InvalidTarget(CombatantId),
}

/// A phase change the combat flow does not allow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("illegal phase transition {from} -> {to}")]
pub struct PhaseError {
    /// Phase being left.
    pub from: CombatPhase,
    /// Phase requested.
    pub to: CombatPhase,
}

/// Failure loading a scenario or ability catalog.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two abilities share a name.
    #[error("duplicate ability: {0}")]
    DuplicateAbility(String),

    /// A combatant references an ability the catalog does not define.
    #[error("combatant {combatant} references unknown ability {ability}")]
    UnknownAbility {
        /// Combatant name.
        combatant: String,
        /// Missing ability name.
        ability: String,
    },

    /// A value is outside its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The scenario does not contain exactly one player.
    #[error("scenario must contain exactly one player, found {0}")]
    PlayerCount(usize),
}
