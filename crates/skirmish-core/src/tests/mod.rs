//! Test module for determinism, integration and property tests.
//!
//! # Test Structure
//!
//! - `determinism.rs`: same seed and inputs replay the same fight
//! - `integration.rs`: end-to-end rounds through the [`Encounter`](crate::encounter::Encounter)
//! - `properties.rs`: randomized checks of the targeting and planning laws
//! - `helpers.rs`: roster setup and autopilot utilities

mod helpers;
mod integration;
