//! Abilities: immutable configuration plus the effect routines they drive.
//!
//! An [`Ability`] is authored once (usually from a catalog file) and shared
//! across rounds behind an `Arc`. It never changes at runtime; everything
//! that varies between uses comes from the upgrade service and the
//! encounter state passed into [`effect::apply`].
//!
//! # Effect Kinds
//!
//! | Kind            | Stat looked up        | Randomness                         |
//! |-----------------|-----------------------|------------------------------------|
//! | `DirectDamage`  | Direct damage         | Per-target critical roll           |
//! | `AreaDamage`    | Area damage           | Per-target critical, splash pick   |
//! | `SpecialAttack` | Special damage        | One miss roll, per-target critical |
//! | `GainResource`  | AP gain               | None                               |

pub mod effect;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::targeting::TargetingStrategy;

pub use effect::{apply, EffectContext, EffectReport, Hit};

/// Ability-type tag used for stat-table lookups.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityType {
    /// Single-target damage.
    Direct,
    /// Multi-target damage.
    Area,
    /// High-damage attack that can miss.
    Special,
    /// Resource (action point) gain.
    Resource,
}

impl fmt::Display for AbilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Area => write!(f, "area"),
            Self::Special => write!(f, "special"),
            Self::Resource => write!(f, "resource"),
        }
    }
}

/// What an ability does to its resolved targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Damage every target, rolling criticals per target.
    DirectDamage,
    /// Like `DirectDamage`, then splash half the base damage onto one
    /// random same-faction bystander.
    AreaDamage,
    /// One miss roll for the whole effect, then damage like `DirectDamage`.
    SpecialAttack,
    /// Grant flat action points to every target.
    GainResource,
}

impl EffectKind {
    /// Stat-table key for this effect.
    #[must_use]
    pub const fn ability_type(self) -> AbilityType {
        match self {
            Self::DirectDamage => AbilityType::Direct,
            Self::AreaDamage => AbilityType::Area,
            Self::SpecialAttack => AbilityType::Special,
            Self::GainResource => AbilityType::Resource,
        }
    }
}

/// Immutable ability configuration.
///
/// # Example
///
/// ```
/// use skirmish_core::ability::{Ability, AbilityType, EffectKind};
/// use skirmish_core::targeting::TargetingStrategy;
///
/// let volley = Ability::new(
///     "Volley",
///     40,
///     EffectKind::AreaDamage,
///     TargetingStrategy::RandomEnemies { target_percentage: 0.5 },
/// );
///
/// assert_eq!(volley.cost(), 40);
/// assert_eq!(volley.ability_type(), AbilityType::Area);
/// assert!(volley.targeting().requires_target());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    name: String,
    cost: i32,
    effect: EffectKind,
    targeting: TargetingStrategy,
}

impl Ability {
    /// Creates an ability.
    ///
    /// # Arguments
    ///
    /// * `name` - Unique display name
    /// * `cost` - Action points spent per use
    /// * `effect` - Effect routine to run
    /// * `targeting` - How targets are resolved
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        cost: i32,
        effect: EffectKind,
        targeting: TargetingStrategy,
    ) -> Self {
        Self {
            name: name.into(),
            cost,
            effect,
            targeting,
        }
    }

    /// Shorthand for a [`EffectKind::DirectDamage`] ability.
    #[must_use]
    pub fn direct_damage(name: impl Into<String>, cost: i32, targeting: TargetingStrategy) -> Self {
        Self::new(name, cost, EffectKind::DirectDamage, targeting)
    }

    /// Shorthand for a [`EffectKind::AreaDamage`] ability.
    #[must_use]
    pub fn area_damage(name: impl Into<String>, cost: i32, targeting: TargetingStrategy) -> Self {
        Self::new(name, cost, EffectKind::AreaDamage, targeting)
    }

    /// Shorthand for a [`EffectKind::SpecialAttack`] ability.
    #[must_use]
    pub fn special_attack(name: impl Into<String>, cost: i32, targeting: TargetingStrategy) -> Self {
        Self::new(name, cost, EffectKind::SpecialAttack, targeting)
    }

    /// Shorthand for a [`EffectKind::GainResource`] ability.
    #[must_use]
    pub fn gain_resource(name: impl Into<String>, cost: i32, targeting: TargetingStrategy) -> Self {
        Self::new(name, cost, EffectKind::GainResource, targeting)
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Action-point cost.
    #[must_use]
    pub const fn cost(&self) -> i32 {
        self.cost
    }

    /// Cost after a flat reduction, never below zero.
    #[must_use]
    pub fn effective_cost(&self, reduction: i32) -> i32 {
        self.cost.saturating_sub(reduction).max(0)
    }

    /// Effect routine.
    #[must_use]
    pub const fn effect(&self) -> EffectKind {
        self.effect
    }

    /// Stat-table key.
    #[must_use]
    pub const fn ability_type(&self) -> AbilityType {
        self.effect.ability_type()
    }

    /// Targeting strategy.
    #[must_use]
    pub const fn targeting(&self) -> &TargetingStrategy {
        &self.targeting
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} AP)", self.name, self.cost)
    }
}
