//! User Management Service
//!
//! Admin-facing CRUD over user accounts. Unlike registration, the role is
//! settable here, which is how additional admins are created.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserDto};
use crate::store::UserStore;
use crate::utils::error::{ServiceError, ServiceResult};
use crate::utils::security::{hash_password_with_cost, DEFAULT_BCRYPT_COST};

/// Service handling user account management
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Override the bcrypt cost, used by tests to keep hashing fast
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// List every user account
    pub async fn list(&self) -> ServiceResult<Vec<UserDto>> {
        let users = self.users.get_all().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    /// Fetch a single user by id
    pub async fn get(&self, id: i64) -> ServiceResult<UserDto> {
        let user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    /// Create a user with an explicit role
    pub async fn create(&self, request: CreateUserRequest) -> ServiceResult<UserDto> {
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
            role: request.role,
            created_at: now,
            updated_at: now,
        };

        let users = self.users.begin();
        let user = users.add(user).await?;
        users.commit().await?;
        Ok(user.into())
    }

    /// Update a user's profile and role.
    ///
    /// Email uniqueness is re-checked only when the email actually changes,
    /// so saving a profile with its current email never conflicts with
    /// itself.
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> ServiceResult<UserDto> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let mut user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if request.email != user.email && self.users.email_exists(&request.email).await? {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        user.first_name = request.first_name;
        user.last_name = request.last_name;
        user.email = request.email;
        user.role = request.role;
        user.updated_at = Utc::now();

        let users = self.users.begin();
        users.update(user.clone()).await?;
        users.commit().await?;
        Ok(user.into())
    }

    /// Delete a user and, through the store, everything they own
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.users.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let users = self.users.begin();
        users.remove(id).await?;
        users.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::store::MemoryStore;

    const TEST_COST: u32 = 4;

    fn test_service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new())).with_bcrypt_cost(TEST_COST)
    }

    fn create_request(email: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            password: "Secret123".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = test_service();
        let created = service
            .create(create_request("admin@x.com", UserRole::Admin))
            .await
            .unwrap();
        assert_eq!(created.role, UserRole::Admin);

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.email, "admin@x.com");
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let service = test_service();
        let err = service.get(999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_keeping_own_email_does_not_conflict() {
        let service = test_service();
        let created = service
            .create(create_request("ana@x.com", UserRole::Farmer))
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateUserRequest {
                    first_name: "Anna".to_string(),
                    last_name: "Lee".to_string(),
                    email: "ana@x.com".to_string(),
                    role: UserRole::Farmer,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Anna");
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let service = test_service();
        service
            .create(create_request("first@x.com", UserRole::Farmer))
            .await
            .unwrap();
        let second = service
            .create(create_request("second@x.com", UserRole::Farmer))
            .await
            .unwrap();

        let err = service
            .update(
                second.id,
                UpdateUserRequest {
                    first_name: "Ana".to_string(),
                    last_name: "Lee".to_string(),
                    email: "first@x.com".to_string(),
                    role: UserRole::Farmer,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_user() {
        let service = test_service();
        let created = service
            .create(create_request("ana@x.com", UserRole::Farmer))
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get(created.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(created.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
