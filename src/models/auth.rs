//! Authentication Models
//!
//! Token claims, the authenticated caller identity and the auth response
//! returned by register/login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{UserDto, UserRole};

/// Claims carried by an issued access token.
///
/// The role is duplicated under two claim keys for compatibility with
/// existing API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id as a string
    pub sub: String,
    pub email: String,
    /// Display name ("first last")
    pub name: String,
    pub role: String,
    pub roles: String,
    pub iss: String,
    pub aud: String,
    /// Expiry as a unix timestamp; the single source of truth for token lifetime
    pub exp: i64,
    pub iat: i64,
}

/// Identity of the authenticated caller, extracted from a validated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: UserRole,
}

impl Identity {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

/// Whether the caller may see and manage every user's records
pub fn can_view_all(identity: &Identity) -> bool {
    identity.role == UserRole::Admin
}

/// Response body for successful register/login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    /// Mirrors the token's own expiry claim
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_view_all() {
        assert!(can_view_all(&Identity::new(1, UserRole::Admin)));
        assert!(!can_view_all(&Identity::new(1, UserRole::Farmer)));
    }
}
