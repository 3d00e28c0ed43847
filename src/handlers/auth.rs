use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::info;

use crate::{
    dto::auth::{
        AdminUserResponse, CurrentUserResponse, LoginRequest, LoginResponse, MessageResponse,
        RefreshRequest, RefreshResponse,
    },
    error::AppResult,
    handlers::json_or_default,
    models::user::AdminUser,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Username or password missing", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let login = json_or_default(payload);
    let username = login.username.unwrap_or_default();
    let password = login.password.unwrap_or_default();
    info!("Login attempt for account: {}", username);

    let (tokens, user) = state.auth.login(&username, &password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        tokens,
        user: AdminUserResponse::from(&user),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = RefreshResponse),
        (status = 400, description = "Refresh token missing", body = ErrorResponse),
        (status = 401, description = "Invalid token or inactive user", body = ErrorResponse),
        (status = 500, description = "Server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<RefreshResponse>> {
    let request = json_or_default(payload);
    let refresh_token = request.refresh_token.unwrap_or_default();
    let tokens = state.auth.refresh(&refresh_token).await?;

    Ok(Json(RefreshResponse {
        message: "Token refreshed".to_string(),
        tokens,
    }))
}

/// Tokens are stateless; outstanding ones stay valid until they expire.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout_handler() -> Json<MessageResponse> {
    info!("User logged out");
    Json(MessageResponse::new("Logout successful"))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current admin profile", body = CurrentUserResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me_handler(Extension(user): Extension<AdminUser>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        user: AdminUserResponse::from(&user),
    })
}
