//! Rooms API types

use crate::auth::{AuthError, SimplePushUrls};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Response header carrying the session token of a fresh registration
pub const HAWK_SESSION_TOKEN_HEADER: &str = "Hawk-Session-Token";

/// Every call the scenario makes against the rooms service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Register,
    CreateRoom,
    JoinRoom,
    RefreshRoomPresence,
    LeaveRoom,
    DeleteRoom,
}

impl Action {
    /// The only status code accepted as success
    pub const fn expected_status(self) -> u16 {
        match self {
            Action::Register => 200,
            Action::CreateRoom => 201,
            Action::JoinRoom => 200,
            Action::RefreshRoomPresence => 200,
            Action::LeaveRoom => 204,
            Action::DeleteRoom => 204,
        }
    }

    /// Counter incremented after a successful call
    pub const fn counter_name(self) -> &'static str {
        match self {
            Action::Register => "register",
            Action::CreateRoom => "create-room",
            Action::JoinRoom => "join-room",
            Action::RefreshRoomPresence => "refresh-room-presence",
            Action::LeaveRoom => "leave-room",
            Action::DeleteRoom => "delete-room",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Register => "Registration",
            Action::CreateRoom => "Room creation",
            Action::JoinRoom => "Participant join",
            Action::RefreshRoomPresence => "Participant refresh",
            Action::LeaveRoom => "Room leave",
            Action::DeleteRoom => "Room deletion",
        };
        f.write_str(label)
    }
}

/// Opaque room identifier assigned by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomToken(String);

impl RoomToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /registration`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    #[serde(
        rename = "simplePushURLs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub simple_push_urls: Option<SimplePushUrls>,
}

/// Body of `POST /rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub room_name: String,
    /// Lifetime in hours
    pub expires_in: u32,
    pub room_owner: String,
    pub max_size: u32,
}

/// Body of `POST /rooms` responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    #[serde(default)]
    pub room_token: Option<RoomToken>,
    #[serde(default)]
    pub room_url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Body of `POST /rooms/{token}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum RoomActionRequest {
    Join {
        display_name: String,
        client_max_size: u32,
    },
    Refresh,
    Leave,
}

/// Errors that abort a scenario run
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{action} failed with code {actual} (expected {expected}): {body}")]
    UnexpectedStatusCode {
        action: Action,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("{action} request failed: {source}")]
    Transport {
        action: Action,
        #[source]
        source: reqwest::Error,
    },

    #[error("{action} returned an invalid response: {reason}")]
    InvalidResponse { action: Action, reason: String },

    #[error("{action} request body could not be encoded: {source}")]
    Encode {
        action: Action,
        #[source]
        source: serde_json::Error,
    },

    #[error("{action} could not be signed: {source}")]
    Auth {
        action: Action,
        #[source]
        source: AuthError,
    },
}

impl ScenarioError {
    /// The call that failed
    pub fn action(&self) -> Action {
        match self {
            ScenarioError::UnexpectedStatusCode { action, .. }
            | ScenarioError::Transport { action, .. }
            | ScenarioError::InvalidResponse { action, .. }
            | ScenarioError::Encode { action, .. }
            | ScenarioError::Auth { action, .. } => *action,
        }
    }
}

/// Errors building a `RoomsClient`
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
