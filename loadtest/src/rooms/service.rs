//! Collaborator traits consumed by the room scenario

use async_trait::async_trait;

use super::types::{CreateRoomRequest, RoomToken, ScenarioError};
use crate::auth::{Identity, SimplePushUrls};

/// Produces fresh authenticated identities
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Register a new identity, optionally announcing push endpoints
    async fn register(
        &self,
        push_urls: Option<&SimplePushUrls>,
    ) -> Result<Identity, ScenarioError>;
}

/// The rooms API under test.
///
/// Every call either observes its expected status code or fails; no call is
/// retried or deduplicated.
#[async_trait]
pub trait RoomsService: Send + Sync {
    /// Create a room owned by `owner` and return its token
    async fn create_room(
        &self,
        owner: &Identity,
        request: &CreateRoomRequest,
    ) -> Result<RoomToken, ScenarioError>;

    async fn join_room(
        &self,
        token: &RoomToken,
        identity: &Identity,
        display_name: &str,
        client_max_size: u32,
    ) -> Result<(), ScenarioError>;

    async fn refresh_room_presence(
        &self,
        token: &RoomToken,
        identity: &Identity,
    ) -> Result<(), ScenarioError>;

    async fn leave_room(&self, token: &RoomToken, identity: &Identity)
    -> Result<(), ScenarioError>;

    async fn delete_room(&self, token: &RoomToken, owner: &Identity)
    -> Result<(), ScenarioError>;
}
