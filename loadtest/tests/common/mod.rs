//! Common Test Utilities for Integration Tests
//!
//! An in-process rooms service mock that issues Hawk session tokens, checks
//! every signed request's MAC and records the calls it accepted.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
};
use rooms_loadtest::Action;
use rooms_loadtest::auth::HawkCredentials;
use rooms_loadtest::auth::hawk::{Artifacts, parse_header, payload_hash};
use rooms_loadtest::rooms::{
    CreateRoomRequest, CreateRoomResponse, HAWK_SESSION_TOKEN_HEADER, RegistrationRequest,
    RoomActionRequest, RoomToken,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use uuid::Uuid;

/// Display name every join must announce
pub const PARTICIPANT_DISPLAY_NAME: &str = "Adam";

/// A call accepted by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub action: Action,
    /// Index of the registration whose credentials signed the call
    pub user: usize,
    pub token: Option<String>,
}

#[derive(Default)]
struct MockState {
    addr: Option<SocketAddr>,
    /// Hawk id -> (registration index, credentials)
    identities: Mutex<HashMap<String, (usize, HawkCredentials)>>,
    registrations: Mutex<Vec<RegistrationRequest>>,
    rooms: Mutex<HashSet<String>>,
    calls: Mutex<Vec<MockCall>>,
    create_requests: Mutex<Vec<CreateRoomRequest>>,
    overrides: Mutex<HashMap<Action, StatusCode>>,
}

/// Handle to a running mock rooms service
#[derive(Clone)]
pub struct MockRoomsServer {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockRoomsServer {
    /// Bind to an ephemeral local port and start serving
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock rooms service");
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            addr: Some(addr),
            ..Default::default()
        });

        let app = Router::new()
            .route("/registration", post(register))
            .route("/rooms", post(create_room))
            .route("/rooms/:token", post(room_action).delete(delete_room))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Answer every `action` request with `status`
    pub fn respond_with(&self, action: Action, status: StatusCode) {
        self.state.overrides.lock().unwrap().insert(action, status);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.calls().into_iter().map(|c| c.action).collect()
    }

    pub fn registrations(&self) -> Vec<RegistrationRequest> {
        self.state.registrations.lock().unwrap().clone()
    }

    pub fn create_requests(&self) -> Vec<CreateRoomRequest> {
        self.state.create_requests.lock().unwrap().clone()
    }
}

fn override_for(state: &MockState, action: Action) -> Option<Response> {
    state
        .overrides
        .lock()
        .unwrap()
        .get(&action)
        .map(|status| {
            (
                *status,
                Json(json!({"code": status.as_u16(), "errno": 999, "error": "mock failure"})),
            )
                .into_response()
        })
}

/// Verify the Hawk header and return the signer's registration index
fn authenticate(
    state: &MockState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<usize, StatusCode> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let attributes = parse_header(header).ok_or(StatusCode::UNAUTHORIZED)?;

    let id = attributes.get("id").ok_or(StatusCode::UNAUTHORIZED)?;
    let (user, credentials) = state
        .identities
        .lock()
        .unwrap()
        .get(id)
        .cloned()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let ts = attributes
        .get("ts")
        .and_then(|ts| ts.parse().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let nonce = attributes.get("nonce").ok_or(StatusCode::UNAUTHORIZED)?;
    let addr = state.addr.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let resource = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let mut artifacts = Artifacts::new(
        method.as_str(),
        resource,
        addr.ip().to_string(),
        addr.port(),
        ts,
        nonce.clone(),
    );

    if !body.is_empty() {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let expected = payload_hash(content_type, body);
        if attributes.get("hash") != Some(&expected) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        artifacts.hash = Some(expected);
    }

    let mac = credentials
        .mac(&artifacts)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    if attributes.get("mac") != Some(&mac) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(user)
}

fn record(state: &MockState, action: Action, user: usize, token: Option<String>) {
    state.calls.lock().unwrap().push(MockCall {
        action,
        user,
        token,
    });
}

async fn register(State(state): State<Arc<MockState>>, body: Bytes) -> Response {
    let request: RegistrationRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let user = {
        let mut registrations = state.registrations.lock().unwrap();
        registrations.push(request);
        registrations.len() - 1
    };
    record(&state, Action::Register, user, None);

    if let Some(response) = override_for(&state, Action::Register) {
        return response;
    }

    let session_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let credentials = match HawkCredentials::from_session_token(&session_token) {
        Ok(credentials) => credentials,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    state
        .identities
        .lock()
        .unwrap()
        .insert(credentials.id().to_string(), (user, credentials));

    (
        StatusCode::OK,
        [(HAWK_SESSION_TOKEN_HEADER, session_token)],
        Json(json!({})),
    )
        .into_response()
}

async fn create_room(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let user = match authenticate(&state, &method, &uri, &headers, &body) {
        Ok(user) => user,
        Err(status) => return status.into_response(),
    };
    record(&state, Action::CreateRoom, user, None);

    if let Some(response) = override_for(&state, Action::CreateRoom) {
        return response;
    }

    let request: CreateRoomRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    state.create_requests.lock().unwrap().push(request);

    let token = Uuid::new_v4().simple().to_string()[..11].to_string();
    state.rooms.lock().unwrap().insert(token.clone());

    let response = CreateRoomResponse {
        room_token: Some(RoomToken::new(token.clone())),
        room_url: Some(format!("http://rooms.test/{}", token)),
        expires_at: Some(3600),
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn room_action(
    State(state): State<Arc<MockState>>,
    Path(token): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let user = match authenticate(&state, &method, &uri, &headers, &body) {
        Ok(user) => user,
        Err(status) => return status.into_response(),
    };

    let request: RoomActionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let action = match request {
        RoomActionRequest::Join {
            ref display_name, ..
        } if display_name != PARTICIPANT_DISPLAY_NAME => {
            return StatusCode::BAD_REQUEST.into_response();
        }
        RoomActionRequest::Join { .. } => Action::JoinRoom,
        RoomActionRequest::Refresh => Action::RefreshRoomPresence,
        RoomActionRequest::Leave => Action::LeaveRoom,
    };
    record(&state, action, user, Some(token.clone()));

    if let Some(response) = override_for(&state, action) {
        return response;
    }
    if !state.rooms.lock().unwrap().contains(&token) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match request {
        RoomActionRequest::Join {
            client_max_size, ..
        } => (
            StatusCode::OK,
            Json(json!({"clientMaxSize": client_max_size, "participants": []})),
        )
            .into_response(),
        RoomActionRequest::Refresh => (StatusCode::OK, Json(json!({"expires": 30}))).into_response(),
        RoomActionRequest::Leave => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn delete_room(
    State(state): State<Arc<MockState>>,
    Path(token): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &method, &uri, &headers, &[]) {
        Ok(user) => user,
        Err(status) => return status.into_response(),
    };
    record(&state, Action::DeleteRoom, user, Some(token.clone()));

    if let Some(response) = override_for(&state, Action::DeleteRoom) {
        return response;
    }
    if state.rooms.lock().unwrap().remove(&token) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
