//! Rooms Load Test Library
//!
//! Randomized multi-participant scenarios against a rooms signaling API,
//! plus the runner, counters and configuration used by the `rooms-loadtest`
//! binary and by integration tests.

pub mod auth;
pub mod config;
pub mod counters;
pub mod rooms;
pub mod runner;
pub mod scenario;
pub mod status;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use auth::{HawkCredentials, Identity, SimplePushUrls};
pub use counters::{CounterSink, PrometheusCounters, RecordingCounters, TeeCounters};
pub use rooms::{Action, Registrar, RoomToken, RoomsClient, RoomsService, ScenarioError};
pub use runner::{LoadRunner, RunBound, RunReport, RunnerConfig};
pub use scenario::{Decider, RandomDecider, RoomScenario, ScenarioParams, ScriptedDecider};
