//! Scenario and ability catalog loading.
//!
//! A scenario file carries everything an [`Encounter`] needs:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "stats": { "direct_damage": 18, "critical_chance": 0.15 },
//!   "abilities": [
//!     { "name": "Slash", "cost": 20, "effect": "direct_damage",
//!       "targeting": { "kind": "single_enemy" } }
//!   ],
//!   "combatants": [
//!     { "name": "Hero", "faction": "player", "health": 120,
//!       "action_points": 60, "abilities": ["Slash"] }
//!   ]
//! }
//! ```
//!
//! Parsing is followed by [`ScenarioConfig::validate`]; every range check
//! reports the dotted path of the offending field.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ability::Ability;
use crate::combatant::Faction;
use crate::encounter::{CombatantSetup, Encounter};
use crate::error::ConfigError;
use crate::targeting::TargetingStrategy;
use crate::upgrade::StatTable;

// =============================================================================
// Ability catalog
// =============================================================================

/// Shared, validated ability definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct AbilityCatalog {
    abilities: BTreeMap<String, Arc<Ability>>,
}

impl AbilityCatalog {
    /// Builds a catalog, validating every definition.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DuplicateAbility`] if two definitions share a name
    /// - [`ConfigError::InvalidValue`] for a negative cost or a random-enemies
    ///   percentage outside `[0, 1]`
    pub fn from_abilities(abilities: impl IntoIterator<Item = Ability>) -> Result<Self, ConfigError> {
        let mut catalog = Self::default();
        for ability in abilities {
            validate_ability(&ability)?;
            let name = ability.name().to_owned();
            if catalog.abilities.contains_key(&name) {
                return Err(ConfigError::DuplicateAbility(name));
            }
            catalog.abilities.insert(name, Arc::new(ability));
        }
        Ok(catalog)
    }

    /// Looks up an ability by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Ability>> {
        self.abilities.get(name).cloned()
    }

    /// Number of abilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Returns `true` if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Resolves a loadout for `combatant`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownAbility`] for the first missing name.
    pub fn loadout(&self, combatant: &str, names: &[String]) -> Result<Vec<Arc<Ability>>, ConfigError> {
        names
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| ConfigError::UnknownAbility {
                    combatant: combatant.to_owned(),
                    ability: name.clone(),
                })
            })
            .collect()
    }
}

fn validate_ability(ability: &Ability) -> Result<(), ConfigError> {
    if ability.cost() < 0 {
        return Err(invalid(
            format!("abilities.{}.cost", ability.name()),
            format!("must be non-negative, got {}", ability.cost()),
        ));
    }
    if let TargetingStrategy::RandomEnemies { target_percentage } = ability.targeting() {
        check_probability(
            &format!("abilities.{}.targeting.target_percentage", ability.name()),
            *target_percentage,
        )?;
    }
    Ok(())
}

// =============================================================================
// Scenario
// =============================================================================

/// One combatant entry of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantConfig {
    /// Display name.
    pub name: String,
    /// Faction.
    pub faction: Faction,
    /// Starting health.
    pub health: i32,
    /// Health ceiling; defaults to `health`.
    #[serde(default)]
    pub max_health: Option<i32>,
    /// Starting action points; absent means no pool.
    #[serde(default)]
    pub action_points: Option<i32>,
    /// Optional action-point ceiling.
    #[serde(default)]
    pub ap_cap: Option<i32>,
    /// Ability names from the catalog.
    #[serde(default)]
    pub abilities: Vec<String>,
}

/// A complete encounter description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Encounter seed.
    #[serde(default)]
    pub seed: u64,
    /// Upgrade values; missing fields use the fallbacks.
    #[serde(default)]
    pub stats: StatTable,
    /// Ability definitions.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Combatants in roster order.
    pub combatants: Vec<CombatantConfig>,
}

impl ScenarioConfig {
    /// Parses and validates a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input, or the first
    /// validation failure.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reads, parses and validates a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Checks every range constraint and cross-reference.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stats(&self.stats)?;
        let catalog = self.catalog()?;

        let players = self
            .combatants
            .iter()
            .filter(|c| c.faction == Faction::Player)
            .count();
        if players != 1 {
            return Err(ConfigError::PlayerCount(players));
        }

        for combatant in &self.combatants {
            validate_combatant(combatant)?;
            catalog.loadout(&combatant.name, &combatant.abilities)?;
        }
        Ok(())
    }

    /// Builds the ability catalog.
    ///
    /// # Errors
    ///
    /// As [`AbilityCatalog::from_abilities`].
    pub fn catalog(&self) -> Result<AbilityCatalog, ConfigError> {
        AbilityCatalog::from_abilities(self.abilities.iter().cloned())
    }

    /// Builds a ready-to-run encounter.
    ///
    /// `seed` overrides the scenario seed when given.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn build_encounter(&self, seed: Option<u64>) -> Result<Encounter, ConfigError> {
        self.validate()?;
        let catalog = self.catalog()?;

        let mut encounter = Encounter::new(seed.unwrap_or(self.seed));
        for combatant in &self.combatants {
            let mut setup = CombatantSetup::new(combatant.name.clone(), combatant.faction, combatant.health)
                .with_abilities(catalog.loadout(&combatant.name, &combatant.abilities)?);
            if let Some(max) = combatant.max_health {
                setup = setup.with_max_health(max);
            }
            if let Some(points) = combatant.action_points {
                setup = setup.with_action_points(points);
            }
            if let Some(cap) = combatant.ap_cap {
                setup = setup.with_ap_cap(cap);
            }
            encounter.add_combatant(setup);
        }
        tracing::info!(
            seed = encounter.seed(),
            combatants = self.combatants.len(),
            abilities = catalog.len(),
            "encounter built"
        );
        Ok(encounter)
    }
}

fn validate_stats(stats: &StatTable) -> Result<(), ConfigError> {
    for (field, value) in [
        ("stats.direct_damage", stats.direct_damage),
        ("stats.area_damage", stats.area_damage),
        ("stats.special_damage", stats.special_damage),
        ("stats.ap_gain", stats.ap_gain),
        ("stats.ap_cost_reduction", stats.ap_cost_reduction),
    ] {
        if value < 0 {
            return Err(invalid(field, format!("must be non-negative, got {value}")));
        }
    }
    check_probability("stats.critical_chance", stats.critical_chance)?;
    check_probability("stats.miss_chance", stats.miss_chance)
}

fn validate_combatant(combatant: &CombatantConfig) -> Result<(), ConfigError> {
    let path = |field: &str| format!("combatants.{}.{field}", combatant.name);

    let max = combatant.max_health.unwrap_or(combatant.health);
    if max <= 0 {
        return Err(invalid(path("max_health"), format!("must be positive, got {max}")));
    }
    if !(1..=max).contains(&combatant.health) {
        return Err(invalid(
            path("health"),
            format!("must be within 1..={max}, got {}", combatant.health),
        ));
    }
    if let Some(points) = combatant.action_points {
        if points < 0 {
            return Err(invalid(
                path("action_points"),
                format!("must be non-negative, got {points}"),
            ));
        }
        if let Some(cap) = combatant.ap_cap.filter(|&cap| cap < points) {
            return Err(invalid(
                path("ap_cap"),
                format!("must be at least the starting points {points}, got {cap}"),
            ));
        }
    } else if combatant.faction == Faction::Player {
        return Err(invalid(path("action_points"), "the player needs an action point pool"));
    }
    Ok(())
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be within [0, 1], got {value}")))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}
