//! Test Utilities Module
//!
//! In-memory stand-ins for the rooms service and registrar that record every
//! call. Only compiled when running tests.

#![cfg(test)]

use crate::auth::{HawkCredentials, Identity, SimplePushUrls};
use crate::rooms::{Action, CreateRoomRequest, Registrar, RoomToken, RoomsService, ScenarioError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One call observed by `FakeRooms`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub action: Action,
    /// Hawk id of the identity that signed the call
    pub identity: Option<String>,
    pub token: Option<RoomToken>,
    pub push_urls: Option<SimplePushUrls>,
    pub display_name: Option<String>,
    pub client_max_size: Option<u32>,
}

impl RecordedCall {
    fn new(action: Action) -> Self {
        Self {
            action,
            identity: None,
            token: None,
            push_urls: None,
            display_name: None,
            client_max_size: None,
        }
    }
}

/// Rooms service and registrar that answer from memory
#[derive(Debug, Default)]
pub struct FakeRooms {
    calls: Mutex<Vec<RecordedCall>>,
    create_requests: Mutex<Vec<CreateRoomRequest>>,
    failures: HashMap<Action, u16>,
    panics: HashSet<Action>,
    registrations: AtomicUsize,
    rooms: AtomicUsize,
}

impl FakeRooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `action` with `status` instead of its expected status
    pub fn fail_on(mut self, action: Action, status: u16) -> Self {
        self.failures.insert(action, status);
        self
    }

    /// Panic inside the `action` call, after recording it
    pub fn panic_on(mut self, action: Action) -> Self {
        self.panics.insert(action);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_create_request(&self) -> Option<CreateRoomRequest> {
        self.create_requests.lock().unwrap().last().cloned()
    }

    fn record(&self, call: RecordedCall) -> Result<(), ScenarioError> {
        let action = call.action;
        self.calls.lock().unwrap().push(call);
        if self.panics.contains(&action) {
            panic!("injected panic on {}", action);
        }

        match self.failures.get(&action) {
            Some(&actual) => Err(ScenarioError::UnexpectedStatusCode {
                action,
                expected: action.expected_status(),
                actual,
                body: format!("{{\"code\": {}, \"errno\": 999}}", actual),
            }),
            None => Ok(()),
        }
    }

    fn room_call(&self, action: Action, token: &RoomToken, identity: &Identity) -> RecordedCall {
        RecordedCall {
            identity: Some(identity.id().to_string()),
            token: Some(token.clone()),
            ..RecordedCall::new(action)
        }
    }
}

#[async_trait]
impl Registrar for FakeRooms {
    async fn register(
        &self,
        push_urls: Option<&SimplePushUrls>,
    ) -> Result<Identity, ScenarioError> {
        self.record(RecordedCall {
            push_urls: push_urls.cloned(),
            ..RecordedCall::new(Action::Register)
        })?;

        let n = self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(Identity::new(HawkCredentials::new(
            format!("identity-{}", n),
            format!("key-{}", n),
        )))
    }
}

#[async_trait]
impl RoomsService for FakeRooms {
    async fn create_room(
        &self,
        owner: &Identity,
        request: &CreateRoomRequest,
    ) -> Result<RoomToken, ScenarioError> {
        self.create_requests.lock().unwrap().push(request.clone());
        self.record(RecordedCall {
            identity: Some(owner.id().to_string()),
            ..RecordedCall::new(Action::CreateRoom)
        })?;

        let n = self.rooms.fetch_add(1, Ordering::SeqCst);
        Ok(RoomToken::new(format!("room-{}", n)))
    }

    async fn join_room(
        &self,
        token: &RoomToken,
        identity: &Identity,
        display_name: &str,
        client_max_size: u32,
    ) -> Result<(), ScenarioError> {
        self.record(RecordedCall {
            display_name: Some(display_name.to_string()),
            client_max_size: Some(client_max_size),
            ..self.room_call(Action::JoinRoom, token, identity)
        })
    }

    async fn refresh_room_presence(
        &self,
        token: &RoomToken,
        identity: &Identity,
    ) -> Result<(), ScenarioError> {
        self.record(self.room_call(Action::RefreshRoomPresence, token, identity))
    }

    async fn leave_room(
        &self,
        token: &RoomToken,
        identity: &Identity,
    ) -> Result<(), ScenarioError> {
        self.record(self.room_call(Action::LeaveRoom, token, identity))
    }

    async fn delete_room(&self, token: &RoomToken, owner: &Identity) -> Result<(), ScenarioError> {
        self.record(self.room_call(Action::DeleteRoom, token, owner))
    }
}
