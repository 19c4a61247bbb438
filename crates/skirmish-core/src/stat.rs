//! Stat controllers for health and action points.
//!
//! The pipeline only ever touches combatant resources through the
//! [`StatController`] trait. The host may plug in its own controller; the
//! crate ships [`Stat`], a bounded integer resource with observer callbacks.
//!
//! # Bounds
//!
//! - Health clamps to `[0, max]`.
//! - Action points clamp below at 0 and are uncapped above unless a cap is
//!   configured (see [`StatBounds::action_points`]).
//!
//! # Change Notification
//!
//! Every effective change calls the registered observers with a
//! [`StatChange`]. Mutations that leave the value untouched (e.g. damage to
//! an already-empty pool) do not notify.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use skirmish_core::stat::{Stat, StatChange, StatController, StatKind};
//!
//! let mut health = Stat::health(40, 50);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! health.subscribe(Box::new(move |change: &StatChange| {
//!     sink.lock().unwrap().push(change.current);
//! }));
//!
//! health.affect(-15);
//! health.affect(-100);
//!
//! assert_eq!(health.current(), 0);
//! assert_eq!(*seen.lock().unwrap(), vec![25, 0]);
//! assert_eq!(health.kind(), StatKind::Health);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;

/// Which resource a stat represents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Hit points.
    Health,
    /// Action points spent on abilities.
    ActionPoints,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Health => write!(f, "health"),
            Self::ActionPoints => write!(f, "action points"),
        }
    }
}

/// Notification payload for a stat change.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatChange {
    /// Resource that changed.
    pub kind: StatKind,
    /// Value before the change.
    pub previous: i32,
    /// Value after the change.
    pub current: i32,
    /// Upper bound at the time of the change (`None` when uncapped).
    pub max: Option<i32>,
}

impl StatChange {
    /// Signed difference between the new and old value.
    #[must_use]
    pub const fn delta(&self) -> i32 {
        self.current - self.previous
    }
}

/// Callback invoked on every effective change.
pub type StatObserver = Box<dyn FnMut(&StatChange) + Send>;

/// Handle returned by [`StatController::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

/// Resource controller consumed by the pipeline.
///
/// Implementations must apply every mutation immediately; the pipeline
/// does no batching and reads values back right after writing them.
pub trait StatController: Send {
    /// Returns the resource kind.
    fn kind(&self) -> StatKind;

    /// Returns the current value.
    fn current(&self) -> i32;

    /// Returns the upper bound, or `None` when uncapped.
    fn max(&self) -> Option<i32>;

    /// Adds `delta` to the current value, respecting the bounds.
    fn affect(&mut self, delta: i32);

    /// Sets the current value, respecting the bounds.
    fn set(&mut self, value: i32);

    /// Registers an observer for effective changes.
    fn subscribe(&mut self, observer: StatObserver) -> ObserverId;

    /// Removes a previously registered observer.
    ///
    /// Returns `false` if the handle was unknown.
    fn unsubscribe(&mut self, id: ObserverId) -> bool;
}

/// Lower and optional upper bound for a [`Stat`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBounds {
    /// Inclusive lower bound.
    pub min: i32,
    /// Inclusive upper bound, `None` for uncapped.
    pub max: Option<i32>,
}

impl StatBounds {
    /// Bounds for a health pool: `[0, max]`.
    #[must_use]
    pub const fn health(max: i32) -> Self {
        Self {
            min: 0,
            max: Some(max),
        }
    }

    /// Bounds for an action-point pool: `[0, cap]`, uncapped when `cap` is `None`.
    #[must_use]
    pub const fn action_points(cap: Option<i32>) -> Self {
        Self { min: 0, max: cap }
    }

    /// Clamps a value into these bounds.
    #[must_use]
    pub fn clamp(&self, value: i32) -> i32 {
        let value = value.max(self.min);
        match self.max {
            Some(max) => value.min(max),
            None => value,
        }
    }
}

/// Bounded integer resource with observer callbacks.
pub struct Stat {
    kind: StatKind,
    value: i32,
    bounds: StatBounds,
    observers: Vec<(ObserverId, StatObserver)>,
    next_observer: u32,
}

impl fmt::Debug for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stat")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("bounds", &self.bounds)
            .field("observers", &format!("[{} observers]", self.observers.len()))
            .finish()
    }
}

impl Stat {
    /// Creates a stat with the given bounds; the initial value is clamped.
    #[must_use]
    pub fn new(kind: StatKind, value: i32, bounds: StatBounds) -> Self {
        Self {
            kind,
            value: bounds.clamp(value),
            bounds,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Creates a health pool clamped to `[0, max]`.
    #[must_use]
    pub fn health(current: i32, max: i32) -> Self {
        Self::new(StatKind::Health, current, StatBounds::health(max))
    }

    /// Creates an uncapped action-point pool.
    #[must_use]
    pub fn action_points(current: i32) -> Self {
        Self::new(
            StatKind::ActionPoints,
            current,
            StatBounds::action_points(None),
        )
    }

    /// Creates an action-point pool capped at `cap`.
    #[must_use]
    pub fn capped_action_points(current: i32, cap: i32) -> Self {
        Self::new(
            StatKind::ActionPoints,
            current,
            StatBounds::action_points(Some(cap)),
        )
    }

    /// Returns the bounds of this stat.
    #[must_use]
    pub const fn bounds(&self) -> StatBounds {
        self.bounds
    }

    fn write(&mut self, value: i32) {
        let next = self.bounds.clamp(value);
        if next == self.value {
            return;
        }
        let change = StatChange {
            kind: self.kind,
            previous: self.value,
            current: next,
            max: self.bounds.max,
        };
        self.value = next;
        for (_, observer) in &mut self.observers {
            observer(&change);
        }
    }
}

impl StatController for Stat {
    fn kind(&self) -> StatKind {
        self.kind
    }

    fn current(&self) -> i32 {
        self.value
    }

    fn max(&self) -> Option<i32> {
        self.bounds.max
    }

    fn affect(&mut self, delta: i32) {
        self.write(self.value.saturating_add(delta));
    }

    fn set(&mut self, value: i32) {
        self.write(value);
    }

    fn subscribe(&mut self, observer: StatObserver) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }
}

// =============================================================================
// Stat Cache
// =============================================================================

/// Side tables mapping combatants to their health and action-point controllers.
///
/// Built once when the encounter starts and reused for every round.
/// A missing entry is a legitimate state (e.g. a combatant without an AP
/// pool) and every lookup returns an `Option`.
#[derive(Default)]
pub struct StatCache {
    health: BTreeMap<CombatantId, Box<dyn StatController>>,
    action_points: BTreeMap<CombatantId, Box<dyn StatController>>,
}

impl fmt::Debug for StatCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatCache")
            .field("health", &format!("[{} entries]", self.health.len()))
            .field(
                "action_points",
                &format!("[{} entries]", self.action_points.len()),
            )
            .finish()
    }
}

impl StatCache {
    /// Creates empty side tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a health controller.
    pub fn insert_health(&mut self, id: CombatantId, controller: Box<dyn StatController>) {
        self.health.insert(id, controller);
    }

    /// Registers (or replaces) an action-point controller.
    pub fn insert_action_points(&mut self, id: CombatantId, controller: Box<dyn StatController>) {
        self.action_points.insert(id, controller);
    }

    /// Returns the health controller of a combatant.
    #[must_use]
    pub fn health(&self, id: CombatantId) -> Option<&dyn StatController> {
        self.health.get(&id).map(|stat| &**stat)
    }

    /// Returns the mutable health controller of a combatant.
    pub fn health_mut(&mut self, id: CombatantId) -> Option<&mut (dyn StatController + 'static)> {
        self.health.get_mut(&id).map(|stat| &mut **stat)
    }

    /// Returns the action-point controller of a combatant.
    #[must_use]
    pub fn action_points(&self, id: CombatantId) -> Option<&dyn StatController> {
        self.action_points.get(&id).map(|stat| &**stat)
    }

    /// Returns the mutable action-point controller of a combatant.
    pub fn action_points_mut(
        &mut self,
        id: CombatantId,
    ) -> Option<&mut (dyn StatController + 'static)> {
        self.action_points.get_mut(&id).map(|stat| &mut **stat)
    }

    /// Current health of a combatant, if it has a health controller.
    #[must_use]
    pub fn health_value(&self, id: CombatantId) -> Option<i32> {
        self.health(id).map(|stat| stat.current())
    }

    /// Current action points of a combatant, if it has an AP controller.
    #[must_use]
    pub fn action_point_value(&self, id: CombatantId) -> Option<i32> {
        self.action_points(id).map(|stat| stat.current())
    }

    /// Drops every cached controller.
    pub fn clear(&mut self) {
        self.health.clear();
        self.action_points.clear();
    }
}
