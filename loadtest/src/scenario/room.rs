use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::decider::Decider;
use super::params::{
    DEFAULT_SIMPLE_PUSH_URL, PARTICIPANT_NAME, ROOM_EXPIRES_IN, ROOM_NAME, ROOM_OWNER_NAME,
    ScenarioParams,
};
use crate::auth::{Identity, SimplePushUrls};
use crate::counters::CounterSink;
use crate::rooms::{Action, CreateRoomRequest, Registrar, RoomToken, RoomsService, ScenarioError};

/// A room created during a scenario run.
///
/// Only obtainable from a successful create, so every action on a room
/// happens after its token is known.
#[derive(Debug, Clone)]
pub struct Room {
    token: RoomToken,
    owner: Identity,
}

impl Room {
    pub fn token(&self) -> &RoomToken {
        &self.token
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// The acting identity; defaults to the owner
    fn actor<'a>(&'a self, identity: Option<&'a Identity>) -> &'a Identity {
        identity.unwrap_or(&self.owner)
    }
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    pub room_token: RoomToken,
    pub participants: u32,
    pub refreshes: u32,
    pub leaves: u32,
    pub room_deleted: bool,
}

/// Create → join×n → delete, with probabilistic skips
pub struct RoomScenario {
    rooms: Arc<dyn RoomsService>,
    registrar: Arc<dyn Registrar>,
    counters: Arc<dyn CounterSink>,
    params: ScenarioParams,
    push_urls: SimplePushUrls,
}

impl RoomScenario {
    pub fn new(
        rooms: Arc<dyn RoomsService>,
        registrar: Arc<dyn Registrar>,
        counters: Arc<dyn CounterSink>,
    ) -> Self {
        Self {
            rooms,
            registrar,
            counters,
            params: ScenarioParams::default(),
            push_urls: SimplePushUrls::shared(DEFAULT_SIMPLE_PUSH_URL),
        }
    }

    pub fn with_params(mut self, params: ScenarioParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_push_urls(mut self, push_urls: SimplePushUrls) -> Self {
        self.push_urls = push_urls;
        self
    }

    pub fn params(&self) -> &ScenarioParams {
        &self.params
    }

    /// Run one scenario. The first failing call aborts the run.
    pub async fn run(&self, decider: &mut dyn Decider) -> Result<ScenarioOutcome, ScenarioError> {
        let owner = self
            .registrar
            .register(Some(&self.push_urls))
            .await?
            .with_display_name(ROOM_OWNER_NAME);
        let room = self.create_room(owner).await?;

        let participants = decider.participant_count(self.params.max_joiners);
        self.counters
            .increment(&format!("num-participants-{}", participants));
        debug!(room = %room.token, participants, "Room created");

        let mut refreshes = 0;
        let mut leaves = 0;
        for _ in 0..participants {
            let participant = self.registrar.register(None).await?;
            self.join_room(&room, Some(&participant)).await?;

            if decider.chance(self.params.refresh_percent) {
                self.refresh_room_presence(&room, Some(&participant)).await?;
                refreshes += 1;
            }

            if decider.chance(self.params.leave_percent) {
                self.leave_room(&room, Some(&participant)).await?;
                leaves += 1;
            }
        }

        let room_deleted = decider.chance(self.params.delete_percent);
        if room_deleted {
            self.delete_room(&room).await?;
        }

        Ok(ScenarioOutcome {
            room_token: room.token,
            participants,
            refreshes,
            leaves,
            room_deleted,
        })
    }

    /// Create a room owned by `owner`
    pub async fn create_room(&self, owner: Identity) -> Result<Room, ScenarioError> {
        let request = CreateRoomRequest {
            room_name: ROOM_NAME.to_string(),
            expires_in: ROOM_EXPIRES_IN,
            room_owner: owner.display_name().to_string(),
            max_size: self.params.max_joiners,
        };

        let token = self.rooms.create_room(&owner, &request).await?;
        self.record(Action::CreateRoom);
        Ok(Room { token, owner })
    }

    /// Join as `identity`, or as the room owner when `None`.
    ///
    /// Every join announces the participant display name, whoever signs it.
    pub async fn join_room(
        &self,
        room: &Room,
        identity: Option<&Identity>,
    ) -> Result<(), ScenarioError> {
        self.rooms
            .join_room(
                &room.token,
                room.actor(identity),
                PARTICIPANT_NAME,
                self.params.max_joiners,
            )
            .await?;
        self.record(Action::JoinRoom);
        Ok(())
    }

    /// Refresh presence as `identity`, or as the room owner when `None`
    pub async fn refresh_room_presence(
        &self,
        room: &Room,
        identity: Option<&Identity>,
    ) -> Result<(), ScenarioError> {
        self.rooms
            .refresh_room_presence(&room.token, room.actor(identity))
            .await?;
        self.record(Action::RefreshRoomPresence);
        Ok(())
    }

    /// Leave as `identity`, or as the room owner when `None`
    pub async fn leave_room(
        &self,
        room: &Room,
        identity: Option<&Identity>,
    ) -> Result<(), ScenarioError> {
        self.rooms
            .leave_room(&room.token, room.actor(identity))
            .await?;
        self.record(Action::LeaveRoom);
        Ok(())
    }

    /// Delete the room. Always authenticated as the owner.
    pub async fn delete_room(&self, room: &Room) -> Result<(), ScenarioError> {
        self.rooms.delete_room(&room.token, &room.owner).await?;
        self.record(Action::DeleteRoom);
        Ok(())
    }

    fn record(&self, action: Action) {
        debug!(action = action.counter_name(), "Action succeeded");
        self.counters.increment(action.counter_name());
    }
}
