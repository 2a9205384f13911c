//! Authentication Service
//!
//! Registration and login. Registration always creates a `Farmer`; elevated
//! roles are only granted through the admin user management API.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserRole};
use crate::store::UserStore;
use crate::utils::error::{ServiceError, ServiceResult};
use crate::utils::security::{hash_password_with_cost, verify_password, DEFAULT_BCRYPT_COST};

use super::token::TokenService;

/// Generic credential failure message. Identical for unknown email and wrong
/// password so a caller cannot discover which emails are registered.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Service handling registration and login
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Override the bcrypt cost, used by tests to keep hashing fast
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Register a new farmer account and return an access token
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        if self.users.email_exists(&request.email).await? {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password_with_cost(&request.password, self.bcrypt_cost)?;

        let now = Utc::now();
        let user = User {
            id: 0,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password_hash,
            role: UserRole::Farmer,
            created_at: now,
            updated_at: now,
        };

        let users = self.users.begin();
        let user = users.add(user).await?;
        users.commit().await?;

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse {
            token,
            expires_at: self.tokens.expires_at(),
            user: user.into(),
        })
    }

    /// Verify credentials and return an access token
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let user = self
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse {
            token,
            expires_at: self.tokens.expires_at(),
            user: user.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::store::MemoryStore;

    const TEST_COST: u32 = 4;

    fn test_service() -> AuthService {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenService::new(&JwtConfig {
            secret: "test-secret-at-least-16-chars".to_string(),
            issuer: "AgroScan".to_string(),
            audience: "AgroScanClients".to_string(),
            expiration_minutes: 60,
        });
        AuthService::new(store, tokens).with_bcrypt_cost(TEST_COST)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            password: "Secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_farmer_and_issues_valid_token() {
        let service = test_service();
        let response = service.register(register_request("ana@x.com")).await.unwrap();

        assert_eq!(response.user.email, "ana@x.com");
        assert_eq!(response.user.role, UserRole::Farmer);
        assert!(response.expires_at > Utc::now());
        assert_eq!(
            service.tokens.validate(&response.token),
            Some(response.user.id)
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = test_service();
        service.register(register_request("ana@x.com")).await.unwrap();

        let err = service
            .register(register_request("ana@x.com"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Conflict(msg) => assert_eq!(msg, "Email already exists"),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let service = test_service();
        let registered = service.register(register_request("ana@x.com")).await.unwrap();

        let response = service
            .login(LoginRequest {
                email: "ana@x.com".to_string(),
                password: "Secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.id, registered.user.id);
        assert_eq!(service.tokens.validate(&response.token), Some(registered.user.id));
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let service = test_service();
        service.register(register_request("ana@x.com")).await.unwrap();

        let unknown_email = service
            .login(LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "Secret123".to_string(),
            })
            .await
            .unwrap_err();

        let wrong_password = service
            .login(LoginRequest {
                email: "ana@x.com".to_string(),
                password: "WrongPass1".to_string(),
            })
            .await
            .unwrap_err();

        match (unknown_email, wrong_password) {
            (ServiceError::Unauthorized(a), ServiceError::Unauthorized(b)) => {
                assert_eq!(a, b);
                assert_eq!(a, "Invalid email or password");
            }
            other => panic!("expected two Unauthorized errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let service = test_service();
        let mut request = register_request("not-an-email");
        let err = service.register(request.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        request.email = "ana@x.com".to_string();
        request.password = "short".to_string();
        let err = service.register(request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
