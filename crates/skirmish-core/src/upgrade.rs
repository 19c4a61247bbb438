//! Upgrade/stat service: the numbers behind every ability effect.
//!
//! Effects never hardcode damage or probabilities. They read them from an
//! [`UpgradeService`] supplied by the host (player upgrades, difficulty
//! tables, ...). [`StatTable`] is the data-driven implementation shipped with
//! the crate; its `Default` carries the fallback constants used whenever no
//! service is available.

use serde::{Deserialize, Serialize};

use crate::ability::AbilityType;
use crate::error::EffectError;

/// Fallback damage for direct attacks.
pub const FALLBACK_DIRECT_DAMAGE: i32 = 20;
/// Fallback damage for area attacks (per target).
pub const FALLBACK_AREA_DAMAGE: i32 = 12;
/// Fallback damage for special attacks.
pub const FALLBACK_SPECIAL_DAMAGE: i32 = 35;
/// Fallback critical-hit probability.
pub const FALLBACK_CRITICAL_CHANCE: f64 = 0.1;
/// Fallback miss probability for special attacks.
pub const FALLBACK_MISS_CHANCE: f64 = 0.25;
/// Fallback action points granted by resource abilities.
pub const FALLBACK_AP_GAIN: i32 = 30;

/// Source of upgrade-derived combat values.
pub trait UpgradeService {
    /// Base damage for an ability type.
    fn damage(&self, ability_type: AbilityType) -> i32;

    /// Probability in `[0, 1]` that a damage roll is critical.
    fn critical_chance(&self) -> f64;

    /// Probability in `[0, 1]` that a special attack misses.
    fn miss_chance(&self) -> f64;

    /// Flat action points granted by resource abilities.
    fn ap_gain(&self) -> i32;

    /// Flat reduction applied to the player's ability costs.
    fn ap_cost_reduction(&self) -> i32;
}

/// Data-driven upgrade table.
///
/// # Example
///
/// ```
/// use skirmish_core::ability::AbilityType;
/// use skirmish_core::upgrade::{StatTable, UpgradeService};
///
/// let table: StatTable = serde_json::from_str(r#"{ "direct_damage": 25 }"#).unwrap();
/// assert_eq!(table.damage(AbilityType::Direct), 25);
/// assert_eq!(table.damage(AbilityType::Area), StatTable::default().area_damage);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatTable {
    /// Base damage of direct attacks.
    pub direct_damage: i32,
    /// Base damage of area attacks.
    pub area_damage: i32,
    /// Base damage of special attacks.
    pub special_damage: i32,
    /// Critical-hit probability.
    pub critical_chance: f64,
    /// Special-attack miss probability.
    pub miss_chance: f64,
    /// Action points granted by resource abilities.
    pub ap_gain: i32,
    /// Flat AP cost reduction for the player.
    pub ap_cost_reduction: i32,
}

impl Default for StatTable {
    fn default() -> Self {
        Self {
            direct_damage: FALLBACK_DIRECT_DAMAGE,
            area_damage: FALLBACK_AREA_DAMAGE,
            special_damage: FALLBACK_SPECIAL_DAMAGE,
            critical_chance: FALLBACK_CRITICAL_CHANCE,
            miss_chance: FALLBACK_MISS_CHANCE,
            ap_gain: FALLBACK_AP_GAIN,
            ap_cost_reduction: 0,
        }
    }
}

impl UpgradeService for StatTable {
    fn damage(&self, ability_type: AbilityType) -> i32 {
        match ability_type {
            AbilityType::Direct => self.direct_damage,
            AbilityType::Area => self.area_damage,
            AbilityType::Special => self.special_damage,
            AbilityType::Resource => 0,
        }
    }

    fn critical_chance(&self) -> f64 {
        self.critical_chance
    }

    fn miss_chance(&self) -> f64 {
        self.miss_chance
    }

    fn ap_gain(&self) -> i32 {
        self.ap_gain
    }

    fn ap_cost_reduction(&self) -> i32 {
        self.ap_cost_reduction
    }
}

/// Snapshot of the values one effect invocation needs.
///
/// Resolved once per action so every target of a multi-target effect sees
/// the same numbers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EffectStats {
    /// Base damage for the ability's type.
    pub damage: i32,
    /// Critical-hit probability.
    pub critical_chance: f64,
    /// Miss probability.
    pub miss_chance: f64,
    /// Action points granted.
    pub ap_gain: i32,
}

impl EffectStats {
    /// Reads the values for `ability_type`, falling back to [`StatTable::default`]
    /// when no service is attached.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::InvalidStat`] if the service reports a negative
    /// amount or a probability outside `[0, 1]`.
    pub fn resolve(
        ability_type: AbilityType,
        service: Option<&dyn UpgradeService>,
    ) -> Result<Self, EffectError> {
        let fallback = StatTable::default();
        let service = service.unwrap_or(&fallback);

        let stats = Self {
            damage: service.damage(ability_type),
            critical_chance: service.critical_chance(),
            miss_chance: service.miss_chance(),
            ap_gain: service.ap_gain(),
        };
        stats.validate()?;
        Ok(stats)
    }

    fn validate(&self) -> Result<(), EffectError> {
        if self.damage < 0 {
            return Err(EffectError::InvalidStat {
                stat: "damage",
                value: f64::from(self.damage),
            });
        }
        if self.ap_gain < 0 {
            return Err(EffectError::InvalidStat {
                stat: "ap_gain",
                value: f64::from(self.ap_gain),
            });
        }
        for (stat, value) in [
            ("critical_chance", self.critical_chance),
            ("miss_chance", self.miss_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EffectError::InvalidStat { stat, value });
            }
        }
        Ok(())
    }
}
