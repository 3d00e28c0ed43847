use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DeleteUploadRequest {
    #[serde(default)]
    pub url: String,
}
