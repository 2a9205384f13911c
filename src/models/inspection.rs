//! Inspection Model
//!
//! Inspection entity, status/category enums and the API representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::inspection_analysis::InspectionAnalysis;
use super::inspection_image::InspectionImage;
use super::user::User;

/// Progress state of an inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inspection_status", rename_all = "snake_case")]
pub enum InspectionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Kind of crop being inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inspection_category", rename_all = "snake_case")]
pub enum InspectionCategory {
    Plant,
    Vegetable,
}

/// Inspection entity as persisted
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Inspection {
    pub id: i64,
    pub plant_name: String,
    pub inspection_date: DateTime<Utc>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub notes: Option<String>,
    pub status: InspectionStatus,
    pub category: InspectionCategory,
    /// Owning user
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An inspection with its related rows eagerly attached
#[derive(Debug, Clone)]
pub struct InspectionWithRelated {
    pub inspection: Inspection,
    /// Owning user, populated by single-inspection lookups
    pub owner: Option<User>,
    pub images: Vec<InspectionImage>,
    pub analyses: Vec<InspectionAnalysis>,
}

/// Inspection representation for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionDto {
    pub id: i64,
    pub plant_name: String,
    pub inspection_date: DateTime<Utc>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub notes: Option<String>,
    pub status: InspectionStatus,
    pub category: InspectionCategory,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Image paths linked to this inspection
    pub images: Vec<String>,
}

impl From<Inspection> for InspectionDto {
    fn from(inspection: Inspection) -> Self {
        InspectionDto {
            id: inspection.id,
            plant_name: inspection.plant_name,
            inspection_date: inspection.inspection_date,
            country: inspection.country,
            state: inspection.state,
            city: inspection.city,
            notes: inspection.notes,
            status: inspection.status,
            category: inspection.category,
            user_id: inspection.user_id,
            created_at: inspection.created_at,
            updated_at: inspection.updated_at,
            images: Vec::new(),
        }
    }
}

impl From<InspectionWithRelated> for InspectionDto {
    fn from(related: InspectionWithRelated) -> Self {
        let images = related.images.into_iter().map(|img| img.image).collect();
        let mut dto: InspectionDto = related.inspection.into();
        dto.images = images;
        dto
    }
}
