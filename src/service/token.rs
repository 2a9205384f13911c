//! Token Service
//!
//! Issues and validates the HS256 access tokens used by the API. Validation
//! runs with zero leeway and checks issuer and audience, so a token from
//! another deployment of the same code does not authenticate here.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::JwtConfig;
use crate::models::{Claims, User};
use crate::utils::error::{ServiceError, ServiceResult};

/// Token service for access token issuance and validation
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    issuer: String,
    audience: String,
    expires_in: Duration,
}

impl TokenService {
    /// Create a token service from JWT configuration
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            expires_in: Duration::minutes(config.expiration_minutes),
        }
    }

    /// Issue a signed access token for a user
    pub fn issue(&self, user: &User) -> ServiceResult<String> {
        let now = Utc::now();
        let expires_at = now + self.expires_in;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.full_name(),
            role: user.role.to_string(),
            roles: user.role.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(self.secret.as_ref());

        encode(&header, &claims, &encoding_key)
            .map_err(|e| ServiceError::TokenGeneration(e.to_string()))
    }

    /// Expiry timestamp for a token issued now.
    ///
    /// Derived from the configured lifetime so the auth response and the
    /// token's own `exp` claim never disagree.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.expires_in
    }

    /// Decode and validate a token, returning its claims.
    ///
    /// Any failure (bad signature, expiry, wrong issuer or audience,
    /// malformed token) yields `None`; callers treat the request as
    /// unauthenticated without learning why.
    pub fn validate_claims(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let decoding_key = DecodingKey::from_secret(self.secret.as_ref());

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .ok()
    }

    /// Validate a token and extract the user id from its subject claim
    pub fn validate(&self, token: &str) -> Option<i64> {
        self.validate_claims(token)
            .and_then(|claims| claims.sub.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-at-least-16-chars".to_string(),
            issuer: "AgroScan".to_string(),
            audience: "AgroScanClients".to_string(),
            expiration_minutes: 60,
        }
    }

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 42,
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
    fn test_issue_and_validate_round_trip() {
        let service = TokenService::new(&test_config());
        let token = service.issue(&sample_user()).unwrap();

        assert_eq!(service.validate(&token), Some(42));

        let claims = service.validate_claims(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.name, "Ana Lee");
        assert_eq!(claims.role, "Farmer");
        assert_eq!(claims.roles, "Farmer");
        assert_eq!(claims.iss, "AgroScan");
        assert_eq!(claims.aud, "AgroScanClients");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = test_config();
        config.expiration_minutes = -5;
        let expired_issuer = TokenService::new(&config);
        let token = expired_issuer.issue(&sample_user()).unwrap();

        let service = TokenService::new(&test_config());
        assert_eq!(service.validate(&token), None);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let service = TokenService::new(&test_config());
        let token = service.issue(&sample_user()).unwrap();

        let mut other_config = test_config();
        other_config.secret = "another-secret-16-chars-long".to_string();
        let other = TokenService::new(&other_config);
        assert_eq!(other.validate(&token), None);
    }

    #[test]
    fn test_wrong_issuer_or_audience_is_rejected() {
        let service = TokenService::new(&test_config());
        let token = service.issue(&sample_user()).unwrap();

        let mut config = test_config();
        config.issuer = "SomeoneElse".to_string();
        assert_eq!(TokenService::new(&config).validate(&token), None);

        let mut config = test_config();
        config.audience = "OtherClients".to_string();
        assert_eq!(TokenService::new(&config).validate(&token), None);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = TokenService::new(&test_config());
        assert_eq!(service.validate("not.a.token"), None);
        assert_eq!(service.validate(""), None);
    }
}
