//! Status flags for combatants.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Status flags that gate whether a combatant takes part in targeting.
    ///
    /// Any set flag makes the combatant inactive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Disabled by the host (e.g. removed from the scene).
        const DISABLED = 0b0000_0001;
        /// Health reached zero during the encounter.
        const DEFEATED = 0b0000_0010;
    }
}

impl StatusFlags {
    /// Returns `true` if no flag is set.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.is_empty()
    }
}
