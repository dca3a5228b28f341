use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated principal.
///
/// Serialized lowercase; parsed through [`FromStr`] on both paths, so case
/// and surrounding whitespace are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Student,
    Company,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "company" => Ok(Self::Company),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// A role string that is neither `student` nor `company`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

/// Server-side identifier of a user
///
/// The API returns numeric primary keys, but string ids are accepted too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Read-only projection of the authenticated principal.
///
/// `id` and `email` are only absent for a session established from an OAuth
/// callback, which carries nothing but the role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
}

impl UserSummary {
    pub fn new(id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Some(id),
            email: Some(email.into()),
            role,
        }
    }

    /// Principal known only by its role
    pub fn role_only(role: Role) -> Self {
        Self {
            id: None,
            email: None,
            role,
        }
    }
}

/// Access and refresh credential issued together
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self::issued_at(access_token, refresh_token, Utc::now())
    }

    pub fn issued_at(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            issued_at,
        }
    }
}

// Tokens never show up in logs.
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
