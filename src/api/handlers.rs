//! HTTP Request Handlers
//!
//! Axum handlers for processing HTTP requests and responses. Authorization
//! decisions live in the services; handlers only move data between the wire
//! and the service calls.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};

use crate::{
    models::{
        AuthResponse, CreateInspectionAnalysisRequest, CreateInspectionImageRequest,
        CreateInspectionRequest, CreateUserRequest, InspectionAnalysisDto, InspectionDto,
        InspectionImageDto, LoginRequest, RegisterRequest, UpdateInspectionRequest,
        UpdateUserRequest, UserDto,
    },
    service::{
        AuthService, InspectionAnalysisService, InspectionImageService, InspectionService,
        TokenService, UserService,
    },
    storage::FileStorage,
    utils::error::{AppError, AppResult},
    VERSION,
};

use super::middleware::AuthUser;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub inspection_service: Arc<InspectionService>,
    pub image_service: Arc<InspectionImageService>,
    pub analysis_service: Arc<InspectionAnalysisService>,
    pub token_service: Arc<TokenService>,
    pub storage: Arc<FileStorage>,
}

/// Standard success response wrapper
#[derive(serde::Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response body
#[derive(serde::Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse<HealthCheckResponse>> {
    Json(SuccessResponse::new(HealthCheckResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: VERSION.to_string(),
    }))
}

// --- Auth ---

/// Register a new farmer account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<SuccessResponse<AuthResponse>>)> {
    let response = state.auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(response))))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<SuccessResponse<AuthResponse>>> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(SuccessResponse::new(response)))
}

// --- Users (admin only) ---

/// List all user accounts
pub async fn list_users(
    State(state): State<AppState>,
) -> AppResult<Json<SuccessResponse<Vec<UserDto>>>> {
    let users = state.user_service.list().await?;
    Ok(Json(SuccessResponse::new(users)))
}

/// Create a user with an explicit role
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<SuccessResponse<UserDto>>)> {
    let user = state.user_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(user))))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SuccessResponse<UserDto>>> {
    let user = state.user_service.get(id).await?;
    Ok(Json(SuccessResponse::new(user)))
}

/// Update a user's profile and role
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<SuccessResponse<UserDto>>> {
    let user = state.user_service.update(id, request).await?;
    Ok(Json(SuccessResponse::new(user)))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Inspections ---

/// List inspections visible to the caller
pub async fn list_inspections(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
) -> AppResult<Json<SuccessResponse<Vec<InspectionDto>>>> {
    let inspections = state.inspection_service.list(&identity).await?;
    Ok(Json(SuccessResponse::new(inspections)))
}

/// Get a single inspection
pub async fn get_inspection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SuccessResponse<InspectionDto>>> {
    let inspection = state.inspection_service.get(id).await?;
    Ok(Json(SuccessResponse::new(inspection)))
}

/// Create an inspection owned by the caller
pub async fn create_inspection(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Json(request): Json<CreateInspectionRequest>,
) -> AppResult<(StatusCode, Json<SuccessResponse<InspectionDto>>)> {
    let inspection = state.inspection_service.create(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(inspection))))
}

/// Update an inspection
pub async fn update_inspection(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateInspectionRequest>,
) -> AppResult<Json<SuccessResponse<InspectionDto>>> {
    let inspection = state
        .inspection_service
        .update(&identity, id, request)
        .await?;
    Ok(Json(SuccessResponse::new(inspection)))
}

/// Delete an inspection and its images and analyses
pub async fn delete_inspection(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.inspection_service.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Inspection images ---

/// List the images of an inspection
pub async fn list_images_by_inspection(
    State(state): State<AppState>,
    Path(inspection_id): Path<i64>,
) -> AppResult<Json<SuccessResponse<Vec<InspectionImageDto>>>> {
    let images = state.image_service.list_by_inspection(inspection_id).await?;
    Ok(Json(SuccessResponse::new(images)))
}

/// Get a single image record
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SuccessResponse<InspectionImageDto>>> {
    let image = state.image_service.get(id).await?;
    Ok(Json(SuccessResponse::new(image)))
}

/// Attach an already-stored image path to an inspection
pub async fn create_image(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Json(request): Json<CreateInspectionImageRequest>,
) -> AppResult<(StatusCode, Json<SuccessResponse<InspectionImageDto>>)> {
    let image = state.image_service.create(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(image))))
}

/// Upload an image file and attach it to an inspection.
///
/// Expects a multipart form with an `inspection_id` text field and a `file`
/// field. The file is written through [`FileStorage`] and the resulting
/// relative path is recorded exactly like a json-created image.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<SuccessResponse<InspectionImageDto>>)> {
    let mut inspection_id: Option<i64> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("inspection_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?;
                let id = text
                    .parse()
                    .map_err(|_| AppError::Validation("Invalid inspection_id".to_string()))?;
                inspection_id = Some(id);
            }
            Some("file") => {
                let name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?;
                file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let inspection_id = inspection_id
        .ok_or_else(|| AppError::Validation("Missing inspection_id field".to_string()))?;
    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("Missing file field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let path = state.storage.save(&bytes, &file_name).await?;
    let image = state
        .image_service
        .create(
            &identity,
            CreateInspectionImageRequest {
                inspection_id,
                image: path,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(SuccessResponse::new(image))))
}

/// Delete an image record
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.image_service.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Inspection analyses ---

/// List the analyses of an inspection, newest first
pub async fn list_analyses_by_inspection(
    State(state): State<AppState>,
    Path(inspection_id): Path<i64>,
) -> AppResult<Json<SuccessResponse<Vec<InspectionAnalysisDto>>>> {
    let analyses = state
        .analysis_service
        .list_by_inspection(inspection_id)
        .await?;
    Ok(Json(SuccessResponse::new(analyses)))
}

/// The most recent analysis of an inspection
pub async fn latest_analysis_by_inspection(
    State(state): State<AppState>,
    Path(inspection_id): Path<i64>,
) -> AppResult<Json<SuccessResponse<InspectionAnalysisDto>>> {
    let analysis = state
        .analysis_service
        .latest_by_inspection(inspection_id)
        .await?;
    Ok(Json(SuccessResponse::new(analysis)))
}

/// Get a single analysis record
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SuccessResponse<InspectionAnalysisDto>>> {
    let analysis = state.analysis_service.get(id).await?;
    Ok(Json(SuccessResponse::new(analysis)))
}

/// Record an analysis against an inspection
pub async fn create_analysis(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Json(request): Json<CreateInspectionAnalysisRequest>,
) -> AppResult<(StatusCode, Json<SuccessResponse<InspectionAnalysisDto>>)> {
    let analysis = state.analysis_service.create(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(analysis))))
}

/// Update an analysis record
pub async fn update_analysis(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<CreateInspectionAnalysisRequest>,
) -> AppResult<Json<SuccessResponse<InspectionAnalysisDto>>> {
    let analysis = state
        .analysis_service
        .update(&identity, id, request)
        .await?;
    Ok(Json(SuccessResponse::new(analysis)))
}

/// Delete an analysis record
pub async fn delete_analysis(
    State(state): State<AppState>,
    Extension(AuthUser(identity)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.analysis_service.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
