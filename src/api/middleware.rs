//! Authentication Middleware
//!
//! Middleware for token authentication and role gating on API endpoints.

use crate::models::{can_view_all, Identity, UserRole};
use crate::service::TokenService;
use crate::utils::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extension type for storing the authenticated identity in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// Authentication middleware that validates bearer tokens.
///
/// Extracts the Authorization header, validates the token, and inserts the
/// caller's [`Identity`] into request extensions for handlers. Fails closed:
/// a missing header, a malformed header, an invalid token or an unknown role
/// claim all yield 401 without distinguishing the cause to the client.
pub async fn auth_middleware(
    State(token_service): State<Arc<TokenService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".into()))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::Authentication(
            "Invalid Authorization header format".into(),
        ));
    }

    let token = &auth_header[7..];

    let claims = token_service
        .validate_claims(token)
        .ok_or_else(|| AppError::Authentication("Invalid or expired token".into()))?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Authentication("Invalid or expired token".into()))?;
    let role: UserRole = claims
        .role
        .parse()
        .map_err(|_| AppError::Authentication("Invalid or expired token".into()))?;

    request
        .extensions_mut()
        .insert(AuthUser(Identity::new(user_id, role)));

    Ok(next.run(request).await)
}

/// Role-gating middleware for admin-only routes.
///
/// Must run after [`auth_middleware`]; rejects callers whose identity does
/// not carry the admin role.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<AuthUser>()
        .map(|auth_user| auth_user.0)
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".into()))?;

    if !can_view_all(&identity) {
        return Err(AppError::Authentication("Admin access required".into()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::models::User;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware::{from_fn, from_fn_with_state},
        routing::get,
        Extension, Router,
    };
    use chrono::Utc;
    use tower::util::ServiceExt;

    fn test_token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(&JwtConfig {
            secret: "test-secret-at-least-16-chars".to_string(),
            issuer: "AgroScan".to_string(),
            audience: "AgroScanClients".to_string(),
            expiration_minutes: 60,
        }))
    }

    fn sample_user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: 7,
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            email: "ana@x.com".to_string(),
            password_hash: "hashed".to_string(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    async fn echo_identity(Extension(AuthUser(identity)): Extension<AuthUser>) -> String {
        identity.user_id.to_string()
    }

    fn auth_app(token_service: Arc<TokenService>) -> Router {
        Router::new()
            .route("/test", get(echo_identity))
            .layer(from_fn_with_state(token_service, auth_middleware))
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let app = auth_app(test_token_service());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_header_format_is_unauthorized() {
        let app = auth_app(test_token_service());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header(AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_passes_identity_to_handler() {
        let token_service = test_token_service();
        let token = token_service.issue(&sample_user(UserRole::Farmer)).unwrap();
        let app = auth_app(token_service);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"7");
    }

    #[tokio::test]
    async fn test_require_admin_rejects_farmers() {
        let token_service = test_token_service();
        let farmer_token = token_service.issue(&sample_user(UserRole::Farmer)).unwrap();
        let admin_token = token_service.issue(&sample_user(UserRole::Admin)).unwrap();

        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(from_fn(require_admin))
            .layer(from_fn_with_state(token_service, auth_middleware));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/admin")
            .header(AUTHORIZATION, format!("Bearer {}", farmer_token))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/admin")
            .header(AUTHORIZATION, format!("Bearer {}", admin_token))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
