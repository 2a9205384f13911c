//! AgroScan Inspection Service Server
//!
//! Development and deployment entry point: loads configuration, connects to
//! PostgreSQL, runs migrations and serves the full API plus the static
//! content root that holds uploaded inspection images.

use std::sync::Arc;

use axum::http::HeaderValue;
use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use agroscan::{
    api::{create_router, AppState},
    config::AppConfig,
    database::DatabaseConfig,
    service::{
        AuthService, InspectionAnalysisService, InspectionImageService, InspectionService,
        TokenService, UserService,
    },
    storage::FileStorage,
    store::PgStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Load configuration from environment
    let config = AppConfig::from_env()?;

    // RUST_LOG still wins when set; the configured level is the default
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.server.log_level),
    )
    .init();

    log::info!("🚀 Starting AgroScan Inspection Service v{}", agroscan::VERSION);
    log::info!("✅ Configuration loaded and validated");

    // Database connection
    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.create_pool().await?;

    log::info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("✅ Database migrations completed");

    // One store backs every entity trait
    let store = Arc::new(PgStore::new(pool));

    let token_service = Arc::new(TokenService::new(&config.jwt));
    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            store.clone(),
            token_service.as_ref().clone(),
        )),
        user_service: Arc::new(UserService::new(store.clone())),
        inspection_service: Arc::new(InspectionService::new(store.clone())),
        image_service: Arc::new(InspectionImageService::new(store.clone(), store.clone())),
        analysis_service: Arc::new(InspectionAnalysisService::new(store.clone(), store.clone())),
        token_service,
        storage: Arc::new(FileStorage::new(&config.storage.content_root)),
    };

    log::info!("✅ Services initialized");

    // "*" in the configured origin list opens CORS up entirely
    let cors = if config.server.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .server
            .cors_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = create_router(state)
        .nest_service(
            "/content",
            ServeDir::new(&config.storage.content_root),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .into_inner(),
        );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🌐 Starting server on {}", bind_addr);

    log::info!("📋 API Endpoints:");
    log::info!("   GET  /health - Health check");
    log::info!("   POST /api/auth/register - Register farmer account");
    log::info!("   POST /api/auth/login - Log in");
    log::info!("   CRUD /api/users - User management (admin only)");
    log::info!("   CRUD /api/inspections - Inspection records");
    log::info!("   CRUD /api/inspection-images - Inspection images (+ /upload)");
    log::info!("   CRUD /api/inspection-analyses - Analysis results (+ /inspection/:id/latest)");
    log::info!("   GET  /content/* - Uploaded files");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("✅ Server listening and ready for requests");
    axum::serve(listener, app).await?;

    Ok(())
}
