//! Client-side checks run before credentials leave the browser

use crate::types::Role;
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Login form body for `POST /auth/login/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: impl Into<String>) -> Self {
        Self {
            email: normalize_email(email),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.email, "email")?;
        require(&self.password, "password")
    }
}

/// Role-specific part of a registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RegistrationProfile {
    Student {
        first_name: String,
        last_name: String,
        #[serde(default)]
        university: String,
        #[serde(default)]
        course_of_study: String,
    },
    Company {
        company_name: String,
        #[serde(default)]
        industry: String,
    },
}

impl RegistrationProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::Company { .. } => Role::Company,
        }
    }
}

/// Registration body for `POST /auth/register/`.
///
/// The API expects `username` to mirror the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(flatten)]
    pub profile: RegistrationProfile,
}

impl RegisterRequest {
    pub fn new(
        email: &str,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
        profile: RegistrationProfile,
    ) -> Self {
        let email = normalize_email(email);
        Self {
            username: email.clone(),
            email,
            password: password.into(),
            confirm_password: confirm_password.into(),
            profile,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.email, "email")?;
        require(&self.password, "password")?;
        require(&self.confirm_password, "confirm_password")?;
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        match &self.profile {
            RegistrationProfile::Student {
                first_name,
                last_name,
                ..
            } => {
                require(first_name, "first_name")?;
                require(last_name, "last_name")
            }
            RegistrationProfile::Company { company_name, .. } => {
                require(company_name, "company_name")
            }
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `something@something.something`, no whitespace
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !email.chars().any(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}
