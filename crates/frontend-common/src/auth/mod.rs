//! Authentication module

pub mod context;

pub use context::{AuthAction, AuthContext, AuthContextData, AuthProvider, use_auth, use_session};

use crate::client::auth_service;
use portal_core::{LoginRequest, RegisterRequest, UserSummary};
use portal_http::ClientError;
use tracing::error;
use wasm_bindgen_futures::spawn_local;
use yew::Callback;

/// Log in, then report the outcome to `on_done`
pub fn login(request: LoginRequest, on_done: Callback<Result<UserSummary, ClientError>>) {
    spawn_local(async move {
        let result = match auth_service() {
            Ok(service) => service.login(request).await,
            Err(err) => Err(err),
        };
        on_done.emit(result);
    });
}

/// Register a new account, then report the outcome to `on_done`
pub fn register(request: RegisterRequest, on_done: Callback<Result<UserSummary, ClientError>>) {
    spawn_local(async move {
        let result = match auth_service() {
            Ok(service) => service.register(request).await,
            Err(err) => Err(err),
        };
        on_done.emit(result);
    });
}

/// End the session. Views follow the session to `Unauthenticated`.
pub fn logout() {
    match auth_service() {
        Ok(service) => spawn_local(async move { service.logout().await }),
        Err(err) => error!(error = %err, "Cannot log out without an API client"),
    }
}
