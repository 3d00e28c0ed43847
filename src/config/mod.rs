use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Application configuration structure
///
/// Layering, lowest to highest priority:
/// - built-in defaults
/// - `config.yaml`
/// - well-known deployment variables (`AWS_*`, `JWT_*`, `MONGODB_URI`)
/// - `APP_` prefixed variables, `__` separating nested keys

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub dev_admin: DevAdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub debug: bool,
    /// Serve logins from an in-memory store seeded with `dev_admin`
    pub dev_mode: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

/// S3 bucket configuration
///
/// Everything but the region is optional at load time. A missing bucket is
/// only reported when an upload is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket_name: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub public_base_url: Option<String>,
    /// Request body limit for the upload routes
    pub max_upload_bytes: usize,
}

/// 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_name: None,
            region: "us-east-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            public_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevAdminConfig {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "sis-admin".to_string(),
                version: "1.0.0".to_string(),
                debug: true,
                dev_mode: false,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "mongodb://localhost:27017".to_string(),
                name: "sis".to_string(),
            },
            jwt: JwtConfig {
                access_secret: "default-secret-key".to_string(),
                refresh_secret: "default-refresh-secret-key".to_string(),
                access_ttl_minutes: 15,
                refresh_ttl_days: 7,
            },
            storage: StorageConfig::default(),
            dev_admin: DevAdminConfig {
                username: "admin".to_string(),
                password: "admin123".to_string(),
                role: "superadmin".to_string(),
            },
        }
    }
}

/// Deployment variables that keep their conventional names
const WELL_KNOWN_ENV: [(&str, &str); 7] = [
    ("AWS_ACCESS_KEY_ID", "storage.access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "storage.secret_access_key"),
    ("AWS_BUCKET_NAME", "storage.bucket_name"),
    ("AWS_REGION", "storage.region"),
    ("JWT_SECRET", "jwt.access_secret"),
    ("JWT_REFRESH_SECRET", "jwt.refresh_secret"),
    ("MONGODB_URI", "database.url"),
];

impl AppConfig {
    pub fn load() -> Result<Self> {
        info!("Loading application configuration...");

        let config: AppConfig = Self::figment().extract()?;

        info!("Configuration loaded successfully");
        info!("name: {:?}", config.app.name);
        info!("Database: {}/{}", config.database.url, config.database.name);
        info!(
            "Bucket: {}",
            config.storage.bucket_name.as_deref().unwrap_or("<not configured>")
        );
        if config.app.dev_mode {
            info!("Dev mode enabled, using in-memory admin store");
        }

        Ok(config)
    }

    pub fn figment() -> Figment {
        let names: Vec<&str> = WELL_KNOWN_ENV.iter().map(|(name, _)| *name).collect();

        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file("config.yaml"))
            .merge(Env::raw().only(&names).map(|key| {
                WELL_KNOWN_ENV
                    .iter()
                    .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                    .map(|(_, path)| (*path).into())
                    .unwrap_or_else(|| key.into())
            }))
            .merge(Env::prefixed("APP_").split("__"))
    }
}
