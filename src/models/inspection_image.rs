//! Inspection Image Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image attached to an inspection, stored as a relative path or URL
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InspectionImage {
    pub id: i64,
    pub inspection_id: i64,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inspection image representation for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionImageDto {
    pub id: i64,
    pub inspection_id: i64,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InspectionImage> for InspectionImageDto {
    fn from(image: InspectionImage) -> Self {
        InspectionImageDto {
            id: image.id,
            inspection_id: image.inspection_id,
            image: image.image,
            created_at: image.created_at,
            updated_at: image.updated_at,
        }
    }
}
