use super::hawk::HawkCredentials;
use serde::{Deserialize, Serialize};

/// Push endpoints announced when registering an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplePushUrls {
    pub calls: String,
    pub rooms: String,
}

impl SimplePushUrls {
    /// Use the same endpoint for calls and rooms notifications
    pub fn shared(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            calls: url.clone(),
            rooms: url,
        }
    }
}

/// A registered actor able to sign requests.
///
/// Identities live for one scenario run and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    credentials: HawkCredentials,
    display_name: String,
}

impl Identity {
    pub fn new(credentials: HawkCredentials) -> Self {
        let display_name = format!("user-{}", credentials.id().chars().take(8).collect::<String>());
        Self {
            credentials,
            display_name,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn credentials(&self) -> &HawkCredentials {
        &self.credentials
    }

    pub fn id(&self) -> &str {
        self.credentials.id()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}
