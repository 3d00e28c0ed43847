pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::AppConfig;
pub use services::{auth::AuthService, storage::StorageService};

use crate::middleware::AuthMiddleware;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub storage: Arc<StorageService>,
    pub config: Arc<AppConfig>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login_handler,
        handlers::auth::refresh_handler,
        handlers::auth::logout_handler,
        handlers::auth::me_handler,
        handlers::upload::upload_file,
        handlers::upload::upload_image,
        handlers::upload::delete_upload,
    ),
    components(schemas(
        dto::auth::LoginRequest,
        dto::auth::RefreshRequest,
        dto::auth::TokenPair,
        dto::auth::AdminUserResponse,
        dto::auth::LoginResponse,
        dto::auth::RefreshResponse,
        dto::auth::CurrentUserResponse,
        dto::auth::MessageResponse,
        dto::upload::UploadResponse,
        dto::upload::DeleteUploadRequest,
        error::ErrorResponse
    )),
    tags(
        (name = "auth", description = "Admin authentication"),
        (name = "uploads", description = "File and image storage")
    ),
    info(
        title = "SIS Admin API",
        version = "1.0.0",
        description = "Authentication and storage API for the student information system admin panel"
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    // Public auth routes - no authentication required
    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route("/api/auth/refresh", post(handlers::auth::refresh_handler))
        .route("/api/auth/logout", post(handlers::auth::logout_handler));

    // Multipart uploads get their own body limit instead of axum's 2 MB default
    let upload_routes = Router::new()
        .route("/api/uploads/file", post(handlers::upload::upload_file))
        .route("/api/uploads/image", post(handlers::upload::upload_image))
        .layer(DefaultBodyLimit::max(state.config.storage.max_upload_bytes));

    // Protected API routes - require a valid access token
    let protected_api_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me_handler))
        .route("/api/uploads", delete(handlers::upload::delete_upload))
        .merge(upload_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::auth_middleware,
        ));

    let api_docs_routes =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "status": "ok" })) }))
        .merge(auth_routes)
        .merge(protected_api_routes)
        .merge(api_docs_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
