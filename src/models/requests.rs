//! Request Types
//!
//! Inbound request bodies with validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::inspection::{InspectionCategory, InspectionStatus};
use super::inspection_analysis::AnalysisStatus;
use super::user::UserRole;

/// Request body for user registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for admin user creation; unlike registration, the role is
/// settable directly
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: UserRole,
}

/// Request body for updating a user profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: UserRole,
}

/// Request body for creating an inspection
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInspectionRequest {
    #[validate(length(min = 1, max = 200, message = "Plant name must be 1-200 characters"))]
    pub plant_name: String,

    pub inspection_date: DateTime<Utc>,

    #[validate(length(min = 1, max = 100, message = "Country must be 1-100 characters"))]
    pub country: String,

    #[validate(length(min = 1, max = 100, message = "State must be 1-100 characters"))]
    pub state: String,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: String,

    pub notes: Option<String>,

    pub status: InspectionStatus,

    pub category: InspectionCategory,
}

/// Request body for updating an inspection; all fields are replaced
pub type UpdateInspectionRequest = CreateInspectionRequest;

/// Request body for attaching an image path to an inspection
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInspectionImageRequest {
    pub inspection_id: i64,

    #[validate(length(min = 1, max = 500, message = "Image path must be 1-500 characters"))]
    pub image: String,
}

/// Request body for creating or updating an analysis
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInspectionAnalysisRequest {
    pub inspection_id: i64,

    pub status: AnalysisStatus,

    #[validate(range(min = 0.0, max = 1.0, message = "Confidence score must be between 0.0 and 1.0"))]
    pub confidence_score: f64,

    pub description: Option<String>,

    pub treatment_recommendation: Option<String>,
}
