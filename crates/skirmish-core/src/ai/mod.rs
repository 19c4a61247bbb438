//! AI decision making: per-combatant brains and the round planner.

pub mod brain;
pub mod planner;

pub use brain::{brain_for, select_ability, select_target, AllyBrain, Brain, EnemyBrain};
pub use planner::{AiPlanner, BrainTable, PlanContext};
