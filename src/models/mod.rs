//! Data Models Module
//!
//! Entities, enums and request/response types used throughout the service.

pub mod auth;
pub mod inspection;
pub mod inspection_analysis;
pub mod inspection_image;
pub mod requests;
pub mod user;

// Re-export commonly used types
pub use auth::{can_view_all, AuthResponse, Claims, Identity};
pub use inspection::{
    Inspection, InspectionCategory, InspectionDto, InspectionStatus, InspectionWithRelated,
};
pub use inspection_analysis::{AnalysisStatus, InspectionAnalysis, InspectionAnalysisDto};
pub use inspection_image::{InspectionImage, InspectionImageDto};
pub use requests::*;
pub use user::{User, UserDto, UserRole};
