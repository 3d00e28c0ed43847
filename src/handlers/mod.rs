use axum::{extract::rejection::JsonRejection, Json};

pub mod auth;
pub mod upload;

/// Body of a JSON request, or the default when it is absent or malformed
///
/// Keeps bad bodies on the `{message}` error path of each handler instead of
/// axum's plain-text rejection.
pub(crate) fn json_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!("Rejected JSON body: {}", rejection.body_text());
            T::default()
        }
    }
}
