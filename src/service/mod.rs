//! Service Layer Module
//!
//! Domain services sitting between the HTTP handlers and the stores. Each
//! service owns its business rules (ownership checks, uniqueness, credential
//! verification) and treats the store commit as the single persistence point.

pub mod auth;
pub mod inspection;
pub mod inspection_analysis;
pub mod inspection_image;
pub mod token;
pub mod user;

// Re-export services for convenient access
pub use auth::AuthService;
pub use inspection::InspectionService;
pub use inspection_analysis::InspectionAnalysisService;
pub use inspection_image::InspectionImageService;
pub use token::TokenService;
pub use user::UserService;
