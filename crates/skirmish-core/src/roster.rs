//! Roster module: the per-encounter arena of combatants.
//!
//! The Roster is the container for every combatant taking part in an
//! encounter. It provides:
//! - Combatant storage with deterministic iteration order (`BTreeMap`)
//! - Handle allocation (monotonic, so handle order is insertion order)
//! - Side partitioning for targeting queries
//! - Active/defeated bookkeeping
//!
//! # Determinism
//!
//! Handles are assigned monotonically and stored in a `BTreeMap`, so
//! iterating the roster always yields combatants in the order they were
//! added at encounter start. The AI planner relies on this order.
//!
//! # Example
//!
//! ```
//! use skirmish_core::roster::Roster;
//! use skirmish_core::combatant::Faction;
//!
//! let mut roster = Roster::new();
//! let hero = roster.spawn("Hero", Faction::Player);
//! let orc = roster.spawn("Orc", Faction::Enemy);
//!
//! let ids: Vec<_> = roster.ids_sorted().collect();
//! assert_eq!(ids, vec![hero, orc]);
//!
//! let (friendly, hostile) = roster.partition();
//! assert_eq!(friendly, vec![hero]);
//! assert_eq!(hostile, vec![orc]);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, CombatantId, Faction, Side, StatusFlags};

/// Arena of combatants for one encounter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Monotonically increasing handle counter.
    next_id: u64,
    /// Combatant storage with deterministic iteration order.
    combatants: BTreeMap<CombatantId, Combatant>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new active combatant and returns its handle.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name for log messages
    /// * `faction` - Faction tag
    pub fn spawn(&mut self, name: impl Into<String>, faction: Faction) -> CombatantId {
        let id = CombatantId::new(self.next_id);
        self.next_id += 1;
        self.combatants
            .insert(id, Combatant::new(id, name, faction));
        id
    }

    /// Returns a combatant by handle.
    #[must_use]
    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Iterates handles in insertion order.
    pub fn ids_sorted(&self) -> impl Iterator<Item = CombatantId> + '_ {
        self.combatants.keys().copied()
    }

    /// Iterates combatants in insertion order.
    pub fn combatants_sorted(&self) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants.values()
    }

    /// Number of combatants, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// Returns `true` if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Returns `true` if the handle refers to an active combatant.
    ///
    /// Unknown handles are never active.
    #[must_use]
    pub fn is_active(&self, id: CombatantId) -> bool {
        self.get(id).is_some_and(Combatant::is_active)
    }

    /// Faction tag of a combatant.
    #[must_use]
    pub fn faction(&self, id: CombatantId) -> Option<Faction> {
        self.get(id).map(Combatant::faction)
    }

    /// Side of a combatant.
    #[must_use]
    pub fn side(&self, id: CombatantId) -> Option<Side> {
        self.get(id).map(Combatant::side)
    }

    /// Display name of a combatant, or a placeholder for unknown handles.
    #[must_use]
    pub fn name(&self, id: CombatantId) -> &str {
        self.get(id).map_or("<unknown>", Combatant::name)
    }

    /// Splits the roster into friendly (non-enemy) and hostile (enemy) handles.
    ///
    /// Both vectors keep insertion order and include inactive combatants;
    /// targeting filters activity itself.
    #[must_use]
    pub fn partition(&self) -> (Vec<CombatantId>, Vec<CombatantId>) {
        let mut friendly = Vec::new();
        let mut hostile = Vec::new();
        self.partition_into(&mut friendly, &mut hostile);
        (friendly, hostile)
    }

    /// Allocation-free variant of [`Roster::partition`] that reuses buffers.
    pub fn partition_into(&self, friendly: &mut Vec<CombatantId>, hostile: &mut Vec<CombatantId>) {
        friendly.clear();
        hostile.clear();
        for combatant in self.combatants.values() {
            if combatant.faction().is_enemy() {
                hostile.push(combatant.id());
            } else {
                friendly.push(combatant.id());
            }
        }
    }

    /// Active handles on one side, in insertion order.
    pub fn active_on(&self, side: Side) -> impl Iterator<Item = CombatantId> + '_ {
        self.combatants
            .values()
            .filter(move |c| c.side() == side && c.is_active())
            .map(Combatant::id)
    }

    /// Marks a combatant as defeated.
    ///
    /// Returns `true` only when the flag was newly set, so callers can
    /// announce each death exactly once.
    pub fn mark_defeated(&mut self, id: CombatantId) -> bool {
        let Some(combatant) = self.combatants.get_mut(&id) else {
            return false;
        };
        if combatant.status().contains(StatusFlags::DEFEATED) {
            return false;
        }
        combatant.status_mut().insert(StatusFlags::DEFEATED);
        true
    }

    /// Enables or disables a combatant on behalf of the host.
    ///
    /// Returns `false` for unknown handles.
    pub fn set_disabled(&mut self, id: CombatantId, disabled: bool) -> bool {
        let Some(combatant) = self.combatants.get_mut(&id) else {
            return false;
        };
        combatant.status_mut().set(StatusFlags::DISABLED, disabled);
        true
    }
}
