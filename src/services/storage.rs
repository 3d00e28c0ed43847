use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};
use axum::{body::Bytes, http::Uri};

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
    utils::timestamp_millis,
};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An image as received from a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
}

impl ImageUpload {
    pub fn mime_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }
}

/// Public-read object storage on S3
///
/// Uploads fail loudly. Deletes are best effort and never fail the caller,
/// so a database record can be removed even when its file cleanup does not
/// succeed.
#[derive(Clone)]
pub struct StorageService {
    client: Option<Client>,
    bucket: Option<String>,
    region: String,
    public_base_url: Option<String>,
}

impl StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials = Credentials::new(key_id, secret, None, None, "sis-admin-config");
                let s3_config = aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .credentials_provider(credentials)
                    .build();
                Some(Client::from_conf(s3_config))
            }
            _ => {
                tracing::warn!("AWS credentials not configured, uploads will be rejected");
                None
            }
        };

        Self {
            client,
            bucket: config.bucket_name.clone().filter(|b| !b.is_empty()),
            region: config.region.clone(),
            public_base_url: config
                .public_base_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// Upload a document under `files/` and return its public URL
    pub async fn upload_file(&self, bytes: Bytes, file_name: &str, mime_type: &str) -> AppResult<String> {
        let key = object_key("files", file_name);
        self.put_object(key, bytes, mime_type).await
    }

    /// Upload an image to `key_path`, or under `banners/` when no key is given
    pub async fn upload_image(&self, image: ImageUpload, key_path: Option<&str>) -> AppResult<String> {
        let key = image_key(&image, key_path);
        let mime_type = image.mime_type().to_string();

        self.put_object(key, image.bytes, &mime_type).await
    }

    /// Remove the object behind a public URL. Never returns an error.
    pub async fn delete_file(&self, url: &str) {
        let Some(bucket) = self.bucket.as_deref() else {
            return;
        };
        if url.is_empty() {
            return;
        }

        let Some(key) = key_from_url(url) else {
            tracing::error!("Error deleting from S3: cannot derive object key from {}", url);
            return;
        };

        let Some(client) = self.client.as_ref() else {
            tracing::error!("Error deleting from S3: credentials not configured");
            return;
        };

        match client.delete_object().bucket(bucket).key(&key).send().await {
            Ok(_) => tracing::info!("File deleted from S3: {}", url),
            Err(e) => tracing::error!("Error deleting from S3: {}", DisplayErrorContext(&e)),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        match (&self.public_base_url, &self.bucket) {
            (Some(base), _) => format!("{}/{}", base, key),
            (None, Some(bucket)) => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key),
            (None, None) => key.to_string(),
        }
    }

    async fn put_object(&self, key: String, bytes: Bytes, mime_type: &str) -> AppResult<String> {
        let bucket = self
            .bucket
            .as_deref()
            .ok_or_else(|| AppError::Config("AWS_BUCKET_NAME not configured".to_string()))?;
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AppError::Config("AWS credentials not configured".to_string()))?;

        let size = bytes.len();
        client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(mime_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error uploading to S3 ({}): {}", key, DisplayErrorContext(&e));
                AppError::Storage(e.to_string())
            })?;

        let url = self.public_url(&key);
        tracing::info!("Uploaded {} bytes to S3: {}", size, url);
        Ok(url)
    }
}

/// `{prefix}/{unix_millis}-{sanitized name}`
pub fn object_key(prefix: &str, file_name: &str) -> String {
    format!("{}/{}-{}", prefix, timestamp_millis(), sanitize_filename(file_name))
}

/// `key_path` when given, else `banners/{unix_millis}-{name}`
pub fn image_key(image: &ImageUpload, key_path: Option<&str>) -> String {
    match key_path.filter(|k| !k.is_empty()) {
        Some(key) => key.trim_start_matches('/').to_string(),
        None => object_key("banners", image.original_name.as_deref().unwrap_or("upload")),
    }
}

fn sanitize_filename(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() {
        "upload".to_string()
    } else {
        safe
    }
}

/// Object key of a public URL: its last two path segments
pub fn key_from_url(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    uri.scheme()?;

    let segments: Vec<&str> = uri.path().split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., prefix, name] => Some(format!("{}/{}", prefix, name)),
        _ => None,
    }
}
