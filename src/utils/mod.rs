//! Utilities Module
//!
//! Shared utilities for error handling and security used throughout the
//! service.

pub mod error;
pub mod security;

// Re-export commonly used utilities
pub use error::{AppError, AppResult, ErrorResponse, ServiceError, ServiceResult, StoreError};
pub use security::*;
