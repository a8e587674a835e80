//! HTTP client for the rooms service
//!
//! Signs every request (except registration) with the acting identity's Hawk
//! credentials and turns any status other than the action's expected one
//! into `ScenarioError::UnexpectedStatusCode`.

use async_trait::async_trait;
use metrics::histogram;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

use super::service::{Registrar, RoomsService};
use super::types::{
    Action, ClientError, CreateRoomRequest, CreateRoomResponse, HAWK_SESSION_TOKEN_HEADER,
    RegistrationRequest, RoomActionRequest, RoomToken, ScenarioError,
};
use crate::auth::hawk::Artifacts;
use crate::auth::{HawkCredentials, Identity, SimplePushUrls};

const JSON_CONTENT_TYPE: &str = "application/json";
const REQUEST_DURATION_HISTOGRAM: &str = "rooms_loadtest_request_duration_seconds";

/// Rooms API client backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct RoomsClient {
    http: Client,
    base_url: Url,
}

impl RoomsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .pool_max_idle_per_host(200)
            .timeout(timeout)
            .build()?;
        Self::with_client(http, base_url)
    }

    /// Wrap an existing HTTP client (shares its connection pool)
    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an absolute URL with a host".to_string(),
            });
        }

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, keeping any base path prefix
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs that cannot be a base are rejected at construction
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn room_endpoint(&self, token: &RoomToken) -> Url {
        self.endpoint(&["rooms", token.as_str()])
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        action: Action,
        method: Method,
        url: Url,
        identity: Option<&Identity>,
        body: Option<&B>,
    ) -> Result<Response, ScenarioError> {
        let payload = match body {
            Some(body) => Some(
                serde_json::to_vec(body).map_err(|source| ScenarioError::Encode { action, source })?,
            ),
            None => None,
        };

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        if let Some(identity) = identity {
            let mut artifacts = Artifacts::for_url(method.as_str(), &url)
                .map_err(|source| ScenarioError::Auth { action, source })?;
            if let Some(ref payload) = payload {
                artifacts = artifacts.with_payload(JSON_CONTENT_TYPE, payload);
            }
            let authorization = identity
                .credentials()
                .header(&artifacts)
                .map_err(|source| ScenarioError::Auth { action, source })?;
            request = request.header(AUTHORIZATION, authorization);
        }

        if let Some(payload) = payload {
            request = request.body(payload);
        }

        let start = Instant::now();
        let result = request.send().await;
        histogram!(REQUEST_DURATION_HISTOGRAM, "action" => action.counter_name())
            .record(start.elapsed().as_secs_f64());

        let response = result.map_err(|source| ScenarioError::Transport { action, source })?;
        debug!(
            action = action.counter_name(),
            status = response.status().as_u16(),
            "{} {}",
            method,
            url.path()
        );

        expect_status(action, response).await
    }
}

/// Accept only the action's expected status; capture the body otherwise
async fn expect_status(action: Action, response: Response) -> Result<Response, ScenarioError> {
    let expected = action.expected_status();
    let actual = response.status().as_u16();
    if actual == expected {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ScenarioError::UnexpectedStatusCode {
        action,
        expected,
        actual,
        body,
    })
}

#[async_trait]
impl Registrar for RoomsClient {
    async fn register(
        &self,
        push_urls: Option<&SimplePushUrls>,
    ) -> Result<Identity, ScenarioError> {
        let action = Action::Register;
        let request = RegistrationRequest {
            simple_push_urls: push_urls.cloned(),
        };

        let response = self
            .send(
                action,
                Method::POST,
                self.endpoint(&["registration"]),
                None,
                Some(&request),
            )
            .await?;

        let token = response
            .headers()
            .get(HAWK_SESSION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ScenarioError::InvalidResponse {
                action,
                reason: format!("missing {} header", HAWK_SESSION_TOKEN_HEADER),
            })?;

        let credentials = HawkCredentials::from_session_token(token)
            .map_err(|source| ScenarioError::Auth { action, source })?;

        Ok(Identity::new(credentials))
    }
}

#[async_trait]
impl RoomsService for RoomsClient {
    async fn create_room(
        &self,
        owner: &Identity,
        request: &CreateRoomRequest,
    ) -> Result<RoomToken, ScenarioError> {
        let action = Action::CreateRoom;
        let response = self
            .send(
                action,
                Method::POST,
                self.endpoint(&["rooms"]),
                Some(owner),
                Some(request),
            )
            .await?;

        let body: CreateRoomResponse =
            response
                .json()
                .await
                .map_err(|e| ScenarioError::InvalidResponse {
                    action,
                    reason: e.to_string(),
                })?;

        body.room_token.ok_or_else(|| ScenarioError::InvalidResponse {
            action,
            reason: "missing roomToken".to_string(),
        })
    }

    async fn join_room(
        &self,
        token: &RoomToken,
        identity: &Identity,
        display_name: &str,
        client_max_size: u32,
    ) -> Result<(), ScenarioError> {
        let request = RoomActionRequest::Join {
            display_name: display_name.to_string(),
            client_max_size,
        };
        self.send(
            Action::JoinRoom,
            Method::POST,
            self.room_endpoint(token),
            Some(identity),
            Some(&request),
        )
        .await?;
        Ok(())
    }

    async fn refresh_room_presence(
        &self,
        token: &RoomToken,
        identity: &Identity,
    ) -> Result<(), ScenarioError> {
        self.send(
            Action::RefreshRoomPresence,
            Method::POST,
            self.room_endpoint(token),
            Some(identity),
            Some(&RoomActionRequest::Refresh),
        )
        .await?;
        Ok(())
    }

    async fn leave_room(
        &self,
        token: &RoomToken,
        identity: &Identity,
    ) -> Result<(), ScenarioError> {
        self.send(
            Action::LeaveRoom,
            Method::POST,
            self.room_endpoint(token),
            Some(identity),
            Some(&RoomActionRequest::Leave),
        )
        .await?;
        Ok(())
    }

    async fn delete_room(&self, token: &RoomToken, owner: &Identity) -> Result<(), ScenarioError> {
        self.send::<()>(
            Action::DeleteRoom,
            Method::DELETE,
            self.room_endpoint(token),
            Some(owner),
            None,
        )
        .await?;
        Ok(())
    }
}
