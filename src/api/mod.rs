//! API Layer
//!
//! HTTP API endpoints and request handling for the inspection service.

pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use handlers::AppState;
pub use middleware::{auth_middleware, require_admin, AuthUser};
pub use routes::create_router;
