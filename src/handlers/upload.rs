use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::{
    dto::{
        auth::MessageResponse,
        upload::{DeleteUploadRequest, UploadResponse},
    },
    error::{AppError, AppResult},
    handlers::json_or_default,
    services::storage::ImageUpload,
    AppState,
};

struct FilePart {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

fn bad_multipart(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("File exceeds the upload size limit".to_string());
    }
    AppError::Validation(format!("Invalid multipart body: {}", e))
}

/// Collect the `file` part and any text fields named in `text_fields`
async fn read_form(
    multipart: &mut Multipart,
    text_fields: &[&str],
) -> AppResult<(Option<FilePart>, Vec<(String, String)>)> {
    let mut file = None;
    let mut texts = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            tracing::info!(
                "Processing file: {} (type: {}, size: {} bytes)",
                file_name.as_deref().unwrap_or("unknown"),
                content_type.as_deref().unwrap_or("unknown"),
                bytes.len()
            );
            file = Some(FilePart {
                file_name,
                content_type,
                bytes,
            });
        } else if text_fields.contains(&name.as_str()) {
            let value = field.text().await.map_err(bad_multipart)?;
            texts.push((name, value));
        }
    }

    Ok((file, texts))
}

fn require_file(file: Option<FilePart>) -> AppResult<FilePart> {
    match file {
        Some(part) if !part.bytes.is_empty() => Ok(part),
        _ => Err(AppError::Validation("No file uploaded".to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/api/uploads/file",
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file in form", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage not configured", body = ErrorResponse),
        (status = 502, description = "Upload failed", body = ErrorResponse)
    ),
    tag = "uploads"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let (file, _) = read_form(&mut multipart, &[]).await?;
    let part = require_file(file)?;

    let file_name = part.file_name.as_deref().unwrap_or("upload");
    let mime_type = part
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    let url = state.storage.upload_file(part.bytes, file_name, mime_type).await?;
    Ok(Json(UploadResponse { url }))
}

#[utoipa::path(
    post,
    path = "/api/uploads/image",
    responses(
        (status = 200, description = "Image uploaded", body = UploadResponse),
        (status = 400, description = "No image in form or not an image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage not configured", body = ErrorResponse),
        (status = 502, description = "Upload failed", body = ErrorResponse)
    ),
    tag = "uploads"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let (file, texts) = read_form(&mut multipart, &["keyPath"]).await?;
    let part = require_file(file)?;

    if let Some(content_type) = part.content_type.as_deref() {
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "File type {} not allowed",
                content_type
            )));
        }
    }

    let key_path = texts
        .into_iter()
        .find(|(name, _)| name == "keyPath")
        .map(|(_, value)| value);

    let image = ImageUpload {
        bytes: part.bytes,
        original_name: part.file_name,
        mime_type: part.content_type,
    };
    let url = state.storage.upload_image(image, key_path.as_deref()).await?;
    Ok(Json(UploadResponse { url }))
}

/// Best effort: always reports success, failures are only logged.
#[utoipa::path(
    delete,
    path = "/api/uploads",
    request_body = DeleteUploadRequest,
    responses(
        (status = 200, description = "Delete attempted", body = MessageResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    tag = "uploads"
)]
pub async fn delete_upload(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUploadRequest>, JsonRejection>,
) -> Json<MessageResponse> {
    let request = json_or_default(payload);
    state.storage.delete_file(&request.url).await;
    Json(MessageResponse::new("File deleted"))
}
