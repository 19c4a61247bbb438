//! `BattleView` provides read-only access to encounter state for decision makers.
//!
//! Brains never mutate the battle directly. During planning they receive a
//! [`BattleView`] borrowing the roster and the stat tables; the only mutation
//! planning performs (the action-point deduction) is done by the planner
//! itself, after the brain has returned.
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::Faction;
//! use skirmish_core::roster::Roster;
//! use skirmish_core::stat::{Stat, StatCache};
//! use skirmish_core::view::BattleView;
//!
//! let mut roster = Roster::new();
//! let mut stats = StatCache::new();
//! let orc = roster.spawn("Orc", Faction::Enemy);
//! stats.insert_health(orc, Box::new(Stat::health(35, 50)));
//!
//! let view = BattleView::new(&roster, &stats, 1);
//! assert_eq!(view.health(orc), Some(35));
//! assert!(view.is_alive(orc));
//! assert_eq!(view.action_points(orc), None);
//! ```

use crate::combatant::{Combatant, CombatantId, Faction};
use crate::roster::Roster;
use crate::stat::StatCache;

// =============================================================================
// BattleView
// =============================================================================

/// Read-only view of the roster and stat tables.
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    roster: &'a Roster,
    stats: &'a StatCache,
    round: u32,
}

impl<'a> BattleView<'a> {
    /// Creates a view.
    ///
    /// # Arguments
    ///
    /// * `roster` - Combatant identity and status
    /// * `stats` - Health and action-point controllers
    /// * `round` - Current round number (1-based)
    #[must_use]
    pub const fn new(roster: &'a Roster, stats: &'a StatCache, round: u32) -> Self {
        Self {
            roster,
            stats,
            round,
        }
    }

    /// Current round number.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Underlying roster.
    #[must_use]
    pub const fn roster(&self) -> &'a Roster {
        self.roster
    }

    /// Looks up a combatant.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&'a Combatant> {
        self.roster.get(id)
    }

    /// Faction of a combatant.
    #[must_use]
    pub fn faction(&self, id: CombatantId) -> Option<Faction> {
        self.roster.faction(id)
    }

    /// Current health, or `None` without a health controller.
    #[must_use]
    pub fn health(&self, id: CombatantId) -> Option<i32> {
        self.stats.health_value(id)
    }

    /// Maximum health, if the controller has one.
    #[must_use]
    pub fn max_health(&self, id: CombatantId) -> Option<i32> {
        self.stats.health(id).and_then(|stat| stat.max())
    }

    /// Current action points, or `None` without an action-point pool.
    #[must_use]
    pub fn action_points(&self, id: CombatantId) -> Option<i32> {
        self.stats.action_point_value(id)
    }

    /// Returns `true` if the combatant exists and is neither defeated nor disabled.
    #[must_use]
    pub fn is_active(&self, id: CombatantId) -> bool {
        self.roster.is_active(id)
    }

    /// Returns `true` if the combatant has a health controller above zero.
    #[must_use]
    pub fn is_alive(&self, id: CombatantId) -> bool {
        self.health(id).is_some_and(|hp| hp > 0)
    }

    /// Display name, `"<unknown>"` for stale handles.
    #[must_use]
    pub fn name(&self, id: CombatantId) -> &'a str {
        self.roster.name(id)
    }
}
