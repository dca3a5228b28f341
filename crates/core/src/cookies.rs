//! Cookie encoding for the persisted credential pair
//!
//! The browser store writes `document.cookie` one slot at a time and reads
//! the whole cookie string back. Everything here is pure string handling.

use crate::types::CredentialPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::form_urlencoded;

pub const ACCESS_TOKEN_SLOT: &str = "access_token";
pub const REFRESH_TOKEN_SLOT: &str = "refresh_token";
pub const ISSUED_AT_SLOT: &str = "token_issued_at";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Attributes applied to every credential cookie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CookieSettings {
    pub max_age_days: u32,
    pub path: String,
    pub same_site: SameSite,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            max_age_days: 7,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            secure: false,
        }
    }
}

impl CookieSettings {
    pub fn max_age_secs(&self) -> u64 {
        u64::from(self.max_age_days) * SECONDS_PER_DAY
    }

    /// `Set-Cookie`-style assignment for one slot
    pub fn assignment(&self, name: &str, value: &str) -> String {
        self.with_attributes(name, &encode_value(value), self.max_age_secs())
    }

    /// Assignment that makes the browser drop the slot immediately
    pub fn removal(&self, name: &str) -> String {
        self.with_attributes(name, "", 0)
    }

    fn with_attributes(&self, name: &str, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{name}={value}; Max-Age={max_age}; Path={}; SameSite={}",
            self.path,
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Assignments that persist `pair`, tokens first
    pub fn pair_assignments(&self, pair: &CredentialPair) -> [String; 3] {
        [
            self.assignment(ACCESS_TOKEN_SLOT, &pair.access_token),
            self.assignment(REFRESH_TOKEN_SLOT, &pair.refresh_token),
            self.assignment(ISSUED_AT_SLOT, &pair.issued_at.to_rfc3339()),
        ]
    }

    /// Assignments that remove every credential slot
    pub fn pair_removals(&self) -> [String; 3] {
        [
            self.removal(ACCESS_TOKEN_SLOT),
            self.removal(REFRESH_TOKEN_SLOT),
            self.removal(ISSUED_AT_SLOT),
        ]
    }
}

/// Parse a `document.cookie` string into name/value pairs
pub fn parse_cookie_string(cookies: &str) -> HashMap<String, String> {
    cookies
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), decode_value(value.trim())))
        })
        .collect()
}

/// Rebuild the credential pair from a cookie string.
///
/// Both token slots must be present and non-empty. A missing or unreadable
/// issue time falls back to the Unix epoch.
pub fn pair_from_cookie_string(cookies: &str) -> Option<CredentialPair> {
    let mut slots = parse_cookie_string(cookies);
    let access = slots.remove(ACCESS_TOKEN_SLOT).filter(|v| !v.is_empty())?;
    let refresh = slots.remove(REFRESH_TOKEN_SLOT).filter(|v| !v.is_empty())?;
    let issued_at = slots
        .get(ISSUED_AT_SLOT)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    Some(CredentialPair::issued_at(access, refresh, issued_at))
}

fn encode_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn decode_value(value: &str) -> String {
    form_urlencoded::parse(format!("v={value}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}
