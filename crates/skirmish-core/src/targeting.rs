//! Targeting strategies: expanding a pending action into concrete targets.
//!
//! A [`TargetingStrategy`] is plain configuration stored on an ability. The
//! work happens in [`Targeter::find_targets`], which owns a scratch buffer so
//! repeated calls do not allocate. The targeter keeps no state between calls
//! that affects the result; all randomness comes from the injected
//! [`CombatRng`].
//!
//! # Side Assignment
//!
//! The caster's faction picks the opposing roster: a friendly caster hits
//! `enemy_side`, an enemy caster hits `ally_side`. Only [`TargetingStrategy::SelfTarget`]
//! looks at the caster's own side.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use skirmish_core::ability::Ability;
//! use skirmish_core::action::PendingAction;
//! use skirmish_core::combatant::Faction;
//! use skirmish_core::rng::CombatRng;
//! use skirmish_core::roster::Roster;
//! use skirmish_core::targeting::{Targeter, TargetingStrategy};
//!
//! let mut roster = Roster::new();
//! let hero = roster.spawn("Hero", Faction::Player);
//! let orc = roster.spawn("Orc", Faction::Enemy);
//! let troll = roster.spawn("Troll", Faction::Enemy);
//! let (allies, enemies) = roster.partition();
//!
//! let sweep = Arc::new(Ability::area_damage("Sweep", 30, TargetingStrategy::AllEnemies));
//! let action = PendingAction::new(sweep, hero, None);
//!
//! let mut targeter = Targeter::new();
//! let mut rng = CombatRng::new(1);
//! let mut out = Vec::new();
//! targeter.find_targets(&action, &roster, &allies, &enemies, &mut rng, &mut out);
//! assert_eq!(out, vec![orc, troll]);
//! ```

use serde::{Deserialize, Serialize};

use crate::action::PendingAction;
use crate::combatant::{CombatantId, Side};
use crate::rng::CombatRng;
use crate::roster::Roster;

/// Relative slack for snapping a hit count to the nearest whole number, so
/// products such as `5 * 0.6` that land a hair above an integer do not gain
/// an extra target. It scales with the product, so a tiny non-zero share
/// still rounds up to one.
const HIT_COUNT_TOLERANCE: f64 = 1e-9;

/// How an ability chooses its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetingStrategy {
    /// The caster only.
    SelfTarget,
    /// The primary target, if it is still active.
    SingleEnemy,
    /// Every active member of the opposing side.
    AllEnemies,
    /// The primary plus a random share of the rest of the opposing side.
    RandomEnemies {
        /// Fraction of the opposing side (primary included) to hit, in `[0, 1]`.
        target_percentage: f64,
    },
}

impl TargetingStrategy {
    /// Returns `true` if the strategy needs a primary target to be chosen.
    #[must_use]
    pub const fn requires_target(&self) -> bool {
        matches!(self, Self::SingleEnemy | Self::RandomEnemies { .. })
    }

    /// Short label used in log messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SelfTarget => "self",
            Self::SingleEnemy => "single enemy",
            Self::AllEnemies => "all enemies",
            Self::RandomEnemies { .. } => "random enemies",
        }
    }
}

/// Number of targets a random-enemies strategy hits out of `pool_size`.
///
/// `ceil(pool_size * percentage)`, with the percentage clamped to `[0, 1]`.
#[must_use]
pub fn hit_count(pool_size: usize, percentage: f64) -> usize {
    let percentage = if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 1.0)
    };
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let count = {
        let raw = (pool_size as f64) * percentage;
        let nearest = raw.round();
        if (raw - nearest).abs() <= raw * HIT_COUNT_TOLERANCE {
            nearest as usize
        } else {
            raw.ceil() as usize
        }
    };
    count.min(pool_size)
}

/// Resolves targeting strategies against a roster.
#[derive(Debug, Clone, Default)]
pub struct Targeter {
    /// Candidate scratch buffer for random selection.
    pool: Vec<CombatantId>,
}

impl Targeter {
    /// Creates a targeter with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the targets of `action` to `out`.
    ///
    /// The strategy comes from the action's ability; an action without an
    /// ability appends nothing.
    ///
    /// # Arguments
    ///
    /// * `action` - The (possibly retargeted) action to expand
    /// * `roster` - Used for activity and faction lookups
    /// * `ally_side` - Player-side handles
    /// * `enemy_side` - Enemy-side handles
    /// * `rng` - Random source for random-enemies selection
    /// * `out` - Output buffer; existing contents are kept
    pub fn find_targets(
        &mut self,
        action: &PendingAction,
        roster: &Roster,
        ally_side: &[CombatantId],
        enemy_side: &[CombatantId],
        rng: &mut CombatRng,
        out: &mut Vec<CombatantId>,
    ) {
        let Some(ability) = action.ability.as_deref() else {
            return;
        };
        let strategy = ability.targeting();

        if matches!(strategy, TargetingStrategy::SelfTarget) {
            if let Some(caster) = action.caster {
                out.push(caster);
            }
            return;
        }

        let Some(caster_side) = action.caster.and_then(|caster| roster.side(caster)) else {
            tracing::debug!(
                ability = ability.name(),
                "caster side unknown, no opposing roster to target"
            );
            return;
        };
        let opposing = match caster_side.opposing() {
            Side::Hostile => enemy_side,
            Side::Friendly => ally_side,
        };

        match strategy {
            TargetingStrategy::SelfTarget => {}
            TargetingStrategy::SingleEnemy => {
                if let Some(target) = action.target.filter(|t| roster.is_active(*t)) {
                    out.push(target);
                }
            }
            TargetingStrategy::AllEnemies => {
                out.extend(opposing.iter().copied().filter(|id| roster.is_active(*id)));
            }
            TargetingStrategy::RandomEnemies { target_percentage } => {
                self.random_enemies(action, roster, opposing, *target_percentage, rng, out);
            }
        }
    }

    fn random_enemies(
        &mut self,
        action: &PendingAction,
        roster: &Roster,
        opposing: &[CombatantId],
        percentage: f64,
        rng: &mut CombatRng,
        out: &mut Vec<CombatantId>,
    ) {
        let primary = action
            .target
            .filter(|t| roster.is_active(*t) && opposing.contains(t));

        self.pool.clear();
        self.pool.extend(
            opposing
                .iter()
                .copied()
                .filter(|id| Some(*id) != primary && roster.is_active(*id)),
        );

        let included = usize::from(primary.is_some());
        if let Some(primary) = primary {
            out.push(primary);
        }

        let total = hit_count(self.pool.len() + included, percentage);
        let additional = total.saturating_sub(included);
        if additional == 0 {
            return;
        }

        rng.shuffle(&mut self.pool);
        out.extend(self.pool.iter().take(additional).copied());
    }
}
