//! Hawk request signing
//!
//! Client side of the Hawk 1.x `Authorization` header scheme (SHA-256 only),
//! plus derivation of Hawk credentials from the session token handed out by
//! the registration endpoint.

use base64::prelude::*;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// HKDF info string used to stretch a session token into Hawk credentials
const SESSION_TOKEN_INFO: &[u8] = b"identity.mozilla.com/picl/v1/sessionToken";
const DERIVED_KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 6;

/// Hawk credential and signing errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session token is empty")]
    EmptySessionToken,

    #[error("Session token is not valid hex: {0}")]
    InvalidSessionToken(#[from] hex::FromHexError),

    #[error("Key derivation failed")]
    KeyDerivation,

    #[error("Request URL has no host: {0}")]
    MissingHost(String),

    #[error("Invalid MAC key")]
    InvalidKey,
}

/// Hawk id/key pair
#[derive(Clone, PartialEq, Eq)]
pub struct HawkCredentials {
    id: String,
    key: String,
}

impl fmt::Debug for HawkCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HawkCredentials")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl HawkCredentials {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }

    /// Derive credentials from a hex-encoded `Hawk-Session-Token`.
    ///
    /// HKDF-SHA256 (no salt) expands the token into 64 bytes: the first half,
    /// hex-encoded, is the Hawk id and the second half, hex-encoded, is the key.
    pub fn from_session_token(token: &str) -> Result<Self, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::EmptySessionToken);
        }

        let ikm = hex::decode(token)?;
        let hkdf = Hkdf::<Sha256>::new(None, &ikm);
        let mut okm = [0u8; DERIVED_KEY_LENGTH * 2];
        hkdf.expand(SESSION_TOKEN_INFO, &mut okm)
            .map_err(|_| AuthError::KeyDerivation)?;

        Ok(Self {
            id: hex::encode(&okm[..DERIVED_KEY_LENGTH]),
            key: hex::encode(&okm[DERIVED_KEY_LENGTH..]),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Compute the request MAC for the given artifacts
    pub fn mac(&self, artifacts: &Artifacts) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .map_err(|_| AuthError::InvalidKey)?;
        mac.update(artifacts.normalized().as_bytes());
        Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Build the full `Authorization` header value
    pub fn header(&self, artifacts: &Artifacts) -> Result<String, AuthError> {
        let mac = self.mac(artifacts)?;

        let mut header = format!(
            "Hawk id=\"{}\", ts=\"{}\", nonce=\"{}\"",
            self.id, artifacts.ts, artifacts.nonce
        );
        if let Some(ref hash) = artifacts.hash {
            header.push_str(&format!(", hash=\"{}\"", hash));
        }
        if let Some(ref ext) = artifacts.ext {
            header.push_str(&format!(", ext=\"{}\"", ext));
        }
        header.push_str(&format!(", mac=\"{}\"", mac));
        Ok(header)
    }
}

/// Everything that goes into a Hawk MAC besides the key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub method: String,
    /// Path plus query string
    pub resource: String,
    pub host: String,
    pub port: u16,
    pub ts: u64,
    pub nonce: String,
    pub hash: Option<String>,
    pub ext: Option<String>,
}

impl Artifacts {
    pub fn new(
        method: &str,
        resource: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        ts: u64,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            method: method.to_uppercase(),
            resource: resource.into(),
            host: host.into().to_lowercase(),
            port,
            ts,
            nonce: nonce.into(),
            hash: None,
            ext: None,
        }
    }

    /// Artifacts for a request to `url` with a fresh timestamp and nonce
    pub fn for_url(method: &str, url: &Url) -> Result<Self, AuthError> {
        let host = url
            .host_str()
            .ok_or_else(|| AuthError::MissingHost(url.to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| AuthError::MissingHost(url.to_string()))?;

        let mut resource = url.path().to_string();
        if let Some(query) = url.query() {
            resource.push('?');
            resource.push_str(query);
        }

        Ok(Self::new(method, resource, host, port, timestamp(), nonce()))
    }

    pub fn with_payload(mut self, content_type: &str, payload: &[u8]) -> Self {
        self.hash = Some(payload_hash(content_type, payload));
        self
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    fn normalized(&self) -> String {
        format!(
            "hawk.1.header\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            self.ts,
            self.nonce,
            self.method,
            self.resource,
            self.host,
            self.port,
            self.hash.as_deref().unwrap_or(""),
            self.ext.as_deref().unwrap_or(""),
        )
    }
}

/// Hash of a request body as carried in the `hash` header attribute.
///
/// Content-type parameters (e.g. `; charset=utf-8`) are not part of the hash.
pub fn payload_hash(content_type: &str, payload: &[u8]) -> String {
    let content_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(b"hawk.1.payload\n");
    hasher.update(content_type.as_bytes());
    hasher.update(b"\n");
    hasher.update(payload);
    hasher.update(b"\n");
    BASE64_STANDARD.encode(hasher.finalize())
}

/// Parse the attributes of a `Hawk ...` header value.
///
/// Returns `None` when the scheme is not Hawk or an attribute is malformed.
pub fn parse_header(value: &str) -> Option<HashMap<String, String>> {
    let attributes = value.trim().strip_prefix("Hawk ")?;
    let mut parsed = HashMap::new();

    for part in attributes.split(',') {
        let (name, quoted) = part.trim().split_once('=')?;
        let value = quoted.strip_prefix('"')?.strip_suffix('"')?;
        parsed.insert(name.to_string(), value.to_string());
    }

    Some(parsed)
}

/// Current Unix time in seconds
pub fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Random alphanumeric nonce
pub fn nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}
