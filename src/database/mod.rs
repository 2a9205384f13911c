//! Database Module
//!
//! Database connection management for the inspection service.

pub mod connection;

// Re-export commonly used types
pub use connection::{DatabaseConfig, DatabasePool};
