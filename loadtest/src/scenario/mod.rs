//! Randomized room scenario
//!
//! One run: register an owner, create a room, let 1..=N participants join
//! (each maybe refreshing presence and maybe leaving), then maybe delete the
//! room as the owner. Every decision goes through a `Decider` so runs can be
//! forced in tests.

pub mod decider;
pub mod params;
mod room;

pub use decider::{Decider, RandomDecider, ScriptedDecider};
pub use params::ScenarioParams;
pub use room::{Room, RoomScenario, ScenarioOutcome};
