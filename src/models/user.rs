//! User Model
//!
//! User entity, role enum and the public user representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Farmer,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Farmer => write!(f, "Farmer"),
            UserRole::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Farmer" => Ok(UserRole::Farmer),
            "Admin" => Ok(UserRole::Admin),
            _ => Err(()),
        }
    }
}

/// User entity as persisted, including the password hash.
///
/// Never serialized directly in API responses; convert to [`UserDto`] first.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all users (enforced by the store)
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name used in token claims
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// User representation for API responses, without sensitive fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    /// Strips the password hash so it is never exposed in API responses
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 1,
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            email: "ana@x.com".to_string(),
            password_hash: "hashed".to_string(),
            role: UserRole::Farmer,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_dto_conversion_drops_password_hash() {
        let user = sample_user();
        let dto: UserDto = user.into();

        assert_eq!(dto.first_name, "Ana");
        assert_eq!(dto.email, "ana@x.com");
        assert_eq!(dto.role, UserRole::Farmer);
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "Ana Lee");
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("Admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(UserRole::Farmer.to_string(), "Farmer");
        assert!("Owner".parse::<UserRole>().is_err());
    }
}
