//! Request and response contracts of the remote API's auth endpoints

use portal_core::{CredentialPair, UserSummary};
use serde::{Deserialize, Serialize};

/// Successful login or registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserSummary,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    pub fn credentials(&self) -> CredentialPair {
        CredentialPair::new(self.access.clone(), self.refresh.clone())
    }
}

/// Body of `POST /auth/refresh/`
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// The API may omit `refresh` when it does not rotate refresh credentials
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Body of `POST /auth/logout/`
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

/// Body of `POST /auth/forgot-password/`
#[derive(Debug, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Body of `POST /auth/reset-password/`, built from the emailed link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetConfirm {
    pub uidb64: String,
    pub token: String,
    pub new_password: String,
}

/// Generic acknowledgement; the API may return an empty body instead
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
