//! Rooms service access
//!
//! This module provides:
//! - `RoomsService` and `Registrar` traits the scenario is written against
//! - `RoomsClient`, the Hawk-signing HTTP implementation of both
//! - Wire types and `ScenarioError`

mod client;
mod service;
mod types;

pub use client::RoomsClient;
pub use service::{Registrar, RoomsService};
pub use types::{
    Action, ClientError, CreateRoomRequest, CreateRoomResponse, HAWK_SESSION_TOKEN_HEADER,
    RegistrationRequest, RoomActionRequest, RoomToken, ScenarioError,
};
