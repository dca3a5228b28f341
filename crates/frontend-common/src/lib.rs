//! Browser side of the portal session layer
//!
//! Wires the portal-core session machine and the portal-http dispatcher into
//! Yew: a cookie-backed credential store, an [`AuthProvider`] that keeps the
//! component tree in sync with the session, and guard components for
//! role-restricted views.

pub mod auth;
pub mod client;
pub mod components;
pub mod config;
pub mod logging;
pub mod storage;

pub use auth::{AuthContext, AuthProvider, use_auth, use_session};
pub use client::auth_service;
pub use components::{OAuthCallback, RequireRole, Spinner};
pub use storage::CookieCredentialStore;
