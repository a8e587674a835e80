//! Identities and request signing
//!
//! - `HawkCredentials` and the Hawk header signer
//! - `Identity`, the authenticated actor a scenario acts as

pub mod hawk;
mod identity;

pub use hawk::{AuthError, HawkCredentials};
pub use identity::{Identity, SimplePushUrls};
