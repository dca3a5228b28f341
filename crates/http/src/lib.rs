//! Portal HTTP client: the authenticated request dispatcher, credential
//! refresh and the auth endpoints of the remote API.

pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use client::{ApiClient, AuthService, error::ClientError, error::RefreshDenied};
