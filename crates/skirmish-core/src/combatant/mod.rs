//! Combatant module for the decision and resolution pipeline.
//!
//! This module provides the core participant types:
//! - [`CombatantId`]: Handle into the per-encounter roster
//! - [`Faction`]: Tag used for side assignment and splash lookups
//! - [`Side`]: The two opposing groups (player side vs. hostile side)
//! - [`Combatant`]: The roster record itself
//!
//! # Architecture
//!
//! Combatants never own each other. Every cross-reference (caster, target,
//! cache key) is a [`CombatantId`] handle that is resolved against the
//! [`Roster`](crate::roster::Roster) or one of the side tables. Stat
//! controllers and brains live in those side tables, not on the record.
//!
//! # Example
//!
//! ```
//! use skirmish_core::combatant::{Combatant, CombatantId, Faction, Side};
//!
//! let goblin = Combatant::new(CombatantId::new(3), "Goblin", Faction::Enemy);
//!
//! assert_eq!(goblin.id().as_u64(), 3);
//! assert_eq!(goblin.side(), Side::Hostile);
//! assert!(goblin.is_active());
//! ```

pub mod status;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use status::StatusFlags;

/// Unique handle for a combatant within an encounter.
///
/// Handles are assigned monotonically by the roster, so ordering by handle
/// is the same as roster insertion order.
///
/// # Example
///
/// ```
/// use skirmish_core::combatant::CombatantId;
///
/// let a = CombatantId::new(1);
/// let b = CombatantId::new(2);
/// assert!(a < b);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Creates a handle from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this handle.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Faction tag of a combatant.
///
/// The tag decides which side a combatant fights on and is the grouping key
/// for area-damage splash (splash only jumps between members of the same
/// tag).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// The human-controlled combatant.
    Player,
    /// AI-controlled combatant fighting alongside the player.
    Ally,
    /// AI-controlled hostile combatant.
    Enemy,
}

impl Faction {
    /// Returns the side this faction fights on.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::Player | Self::Ally => Side::Friendly,
            Self::Enemy => Side::Hostile,
        }
    }

    /// Returns `true` for the enemy tag.
    #[must_use]
    pub const fn is_enemy(self) -> bool {
        matches!(self, Self::Enemy)
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Ally => write!(f, "Ally"),
            Self::Enemy => write!(f, "Enemy"),
        }
    }
}

/// One of the two opposing groups in an encounter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player and its allies.
    Friendly,
    /// Enemies.
    Hostile,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposing(self) -> Self {
        match self {
            Self::Friendly => Self::Hostile,
            Self::Hostile => Self::Friendly,
        }
    }
}

/// A participant in the encounter.
///
/// A combatant is *active* while it is neither disabled by the host nor
/// defeated. Inactive combatants are skipped by every targeting query but
/// stay addressable by handle for the rest of the encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    name: String,
    faction: Faction,
    status: StatusFlags,
}

impl Combatant {
    /// Creates an active combatant.
    ///
    /// # Arguments
    ///
    /// * `id` - Roster handle for this combatant
    /// * `name` - Display name used in combat log messages
    /// * `faction` - Faction tag
    #[must_use]
    pub fn new(id: CombatantId, name: impl Into<String>, faction: Faction) -> Self {
        Self {
            id,
            name: name.into(),
            faction,
            status: StatusFlags::empty(),
        }
    }

    /// Returns the roster handle.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the faction tag.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Returns the side this combatant fights on.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.faction.side()
    }

    /// Returns the current status flags.
    #[must_use]
    pub const fn status(&self) -> StatusFlags {
        self.status
    }

    /// Returns a mutable reference to the status flags.
    pub fn status_mut(&mut self) -> &mut StatusFlags {
        &mut self.status
    }

    /// Returns `true` if the combatant can be targeted and can act.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
