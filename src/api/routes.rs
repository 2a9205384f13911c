//! API Route Definitions
//!
//! Wires every endpoint to its handler. Auth endpoints and the health check
//! are public; everything else sits behind the token middleware, with the
//! user management routes additionally gated to admins.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use super::handlers::*;
use super::middleware::{auth_middleware, require_admin};

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let admin = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(from_fn(require_admin));

    let protected = Router::new()
        .merge(admin)
        .route(
            "/api/inspections",
            get(list_inspections).post(create_inspection),
        )
        .route(
            "/api/inspections/:id",
            get(get_inspection)
                .put(update_inspection)
                .delete(delete_inspection),
        )
        .route("/api/inspection-images", post(create_image))
        .route("/api/inspection-images/upload", post(upload_image))
        .route(
            "/api/inspection-images/:id",
            get(get_image).delete(delete_image),
        )
        .route(
            "/api/inspection-images/inspection/:inspection_id",
            get(list_images_by_inspection),
        )
        .route("/api/inspection-analyses", post(create_analysis))
        .route(
            "/api/inspection-analyses/:id",
            get(get_analysis)
                .put(update_analysis)
                .delete(delete_analysis),
        )
        .route(
            "/api/inspection-analyses/inspection/:inspection_id",
            get(list_analyses_by_inspection),
        )
        .route(
            "/api/inspection-analyses/inspection/:inspection_id/latest",
            get(latest_analysis_by_inspection),
        )
        .route_layer(from_fn_with_state(
            state.token_service.clone(),
            auth_middleware,
        ));

    public.merge(protected).with_state(state)
}
