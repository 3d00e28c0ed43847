use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, AppState};

pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Require a valid access token belonging to an active admin.
    ///
    /// The resolved `AdminUser` is stored in request extensions.
    pub async fn auth_middleware(
        State(state): State<AppState>,
        headers: HeaderMap,
        mut request: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        let token = extract_token_from_headers(&headers).ok_or_else(|| {
            tracing::debug!("No bearer token on {}", request.uri().path());
            AppError::Unauthorized("Access token is required".to_string())
        })?;

        let user = state.auth.authenticate_access_token(&token).await.map_err(|e| {
            tracing::warn!("Access token rejected: {}", e);
            e
        })?;

        tracing::debug!("Authenticated admin {} ({})", user.username, user.role);
        request.extensions_mut().insert(user);

        Ok(next.run(request).await)
    }
}

pub fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
