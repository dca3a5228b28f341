//! Authentication operations that drive the session state

use super::{ApiClient, ClientError};
use crate::types::{
    AuthResponse, LogoutRequest, MessageResponse, PasswordResetConfirm, PasswordResetRequest,
};
use portal_core::routes::{LOGIN_PATH, landing_path};
use portal_core::validation::{MIN_PASSWORD_LEN, ValidationError, normalize_email, validate_email};
use portal_core::{LoginRequest, RegisterRequest, Role, Session, SessionSnapshot, UserSummary};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, info, warn};

pub const LOGIN_ENDPOINT: &str = "/auth/login/";
pub const REGISTER_ENDPOINT: &str = "/auth/register/";
pub const CURRENT_USER_ENDPOINT: &str = "/auth/user/";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout/";
pub const FORGOT_PASSWORD_ENDPOINT: &str = "/auth/forgot-password/";
pub const RESET_PASSWORD_ENDPOINT: &str = "/auth/reset-password/";

/// Login, registration, logout and the startup session check, each ending in
/// a session transition
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    session: Rc<Session>,
}

impl AuthService {
    /// Bind `client` to `session`: any call ending in
    /// `AuthenticationExpired` moves the session to unauthenticated.
    pub fn new(client: ApiClient, session: Rc<Session>) -> Self {
        let weak = Rc::downgrade(&session);
        client.set_auth_expired_hook(move || {
            if let Some(session) = weak.upgrade() {
                session.expire();
            }
        });
        Self { client, session }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    pub async fn login(&self, request: LoginRequest) -> Result<UserSummary, ClientError> {
        request.validate()?;
        let response: AuthResponse = self.client.public_post(LOGIN_ENDPOINT, &request).await?;
        Ok(self.establish(response))
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserSummary, ClientError> {
        request.validate()?;
        let response: AuthResponse = self.client.public_post(REGISTER_ENDPOINT, &request).await?;
        Ok(self.establish(response))
    }

    fn establish(&self, response: AuthResponse) -> UserSummary {
        self.client.credentials().set(&response.credentials());
        self.session.authenticate(response.user.clone());
        response.user
    }

    /// Fetch the current principal
    pub async fn current_user(&self) -> Result<UserSummary, ClientError> {
        self.client.get(CURRENT_USER_ENDPOINT).await
    }

    /// Startup session check. Leaves `Initializing` whatever the outcome.
    pub async fn check_session(&self) -> SessionSnapshot {
        match self.current_user().await {
            Ok(user) => {
                self.session.resolve_startup(Some(user));
            }
            Err(err) => {
                debug!(error = %err, "Startup session check failed");
                self.session.resolve_startup(None);
            }
        }
        self.session.snapshot()
    }

    /// Tear down the local session, then ask the server to invalidate the
    /// refresh credential. Server failures are logged and ignored.
    pub async fn logout(&self) {
        let refresh = self
            .client
            .credentials()
            .get()
            .map(|pair| pair.refresh_token);
        self.client.credentials().clear();
        self.session.logout();
        info!("Logged out");

        let result: Result<Value, ClientError> = self
            .client
            .public_post(LOGOUT_ENDPOINT, &LogoutRequest { refresh })
            .await;
        if let Err(err) = result {
            warn!(error = %err, "Server-side logout failed");
        }
    }

    /// Complete an OAuth redirect carrying only the principal's role.
    /// Returns the path to navigate to.
    pub fn complete_oauth(&self, role: Option<&str>) -> &'static str {
        match role.map(str::parse::<Role>) {
            Some(Ok(role)) => {
                self.session.authenticate(UserSummary::role_only(role));
                landing_path(role)
            }
            Some(Err(err)) => {
                warn!(%err, "OAuth callback with unknown role");
                self.session.logout();
                LOGIN_PATH
            }
            None => {
                warn!("OAuth callback without role");
                self.session.logout();
                LOGIN_PATH
            }
        }
    }

    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<MessageResponse>, ClientError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        self.client
            .public_post(FORGOT_PASSWORD_ENDPOINT, &PasswordResetRequest { email })
            .await
    }

    pub async fn reset_password(
        &self,
        request: PasswordResetConfirm,
    ) -> Result<Option<MessageResponse>, ClientError> {
        if request.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort.into());
        }
        self.client.public_post(RESET_PASSWORD_ENDPOINT, &request).await
    }
}
