//! AgroScan Inspection Service
//!
//! A plant inspection record management service: farmers register, log in
//! and manage their own inspections with attached images and analysis
//! results, while admins manage user accounts and see every record.
//!
//! # Features
//!
//! - **Authentication**: bcrypt-hashed credentials and HS256 access tokens
//! - **Role-Based Ownership**: farmers see their own records, admins see all
//! - **Inspection Records**: CRUD with eagerly attached images and analyses
//! - **Image Uploads**: multipart upload stored under the content root
//! - **Staged Persistence**: store mutations apply atomically at commit
//! - **Database Integration**: PostgreSQL with connection pooling
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use agroscan::{
//!     api::{create_router, AppState},
//!     config::AppConfig,
//!     database::DatabaseConfig,
//!     service::{
//!         AuthService, InspectionAnalysisService, InspectionImageService,
//!         InspectionService, TokenService, UserService,
//!     },
//!     storage::FileStorage,
//!     store::PgStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let pool = DatabaseConfig::from_env()?.create_pool().await?;
//!     let store = Arc::new(PgStore::new(pool));
//!
//!     let token_service = Arc::new(TokenService::new(&config.jwt));
//!     let state = AppState {
//!         auth_service: Arc::new(AuthService::new(
//!             store.clone(),
//!             token_service.as_ref().clone(),
//!         )),
//!         user_service: Arc::new(UserService::new(store.clone())),
//!         inspection_service: Arc::new(InspectionService::new(store.clone())),
//!         image_service: Arc::new(InspectionImageService::new(store.clone(), store.clone())),
//!         analysis_service: Arc::new(InspectionAnalysisService::new(
//!             store.clone(),
//!             store.clone(),
//!         )),
//!         token_service,
//!         storage: Arc::new(FileStorage::new(&config.storage.content_root)),
//!     };
//!
//!     let app = create_router(state);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: axum handlers, routes and auth middleware
//! - **Service Layer**: business rules, ownership checks, token handling
//! - **Store Layer**: per-entity traits with staged writes and explicit commit
//! - **Models**: entities, enums and request/response structures
//! - **Storage**: upload persistence under the served content root

/// HTTP API layer with handlers, routes and middleware
pub mod api;

/// Configuration management for all service settings
pub mod config;

/// Database connection management and configuration
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Business logic services
pub mod service;

/// Upload storage under the content root
pub mod storage;

/// Data store abstraction with memory and PostgreSQL backends
pub mod store;

/// Shared utilities for security and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_router, AppState};
pub use config::{AppConfig, JwtConfig, ServerConfig, StorageConfig};
pub use database::{DatabaseConfig, DatabasePool};
pub use models::{
    AuthResponse, Identity, Inspection, InspectionAnalysis, InspectionImage, User, UserRole,
};
pub use service::{
    AuthService, InspectionAnalysisService, InspectionImageService, InspectionService,
    TokenService, UserService,
};
pub use storage::FileStorage;
pub use store::{MemoryStore, PgStore};
pub use utils::error::{AppError, AppResult, ErrorResponse, ServiceError, ServiceResult};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
