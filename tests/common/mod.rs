#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use mongodb::bson::{oid::ObjectId, DateTime};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use sis_admin::{
    config::{AppConfig, StorageConfig},
    create_router,
    models::user::{AdminRole, AdminUser},
    services::{
        token::TokenService,
        user_store::{AdminUserStore, InMemoryAdminUserStore},
    },
    AppState, AuthService, StorageService,
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryAdminUserStore>,
    pub tokens: Arc<TokenService>,
    pub admin_id: ObjectId,
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.access_secret = "integration-access-secret".to_string();
    config.jwt.refresh_secret = "integration-refresh-secret".to_string();
    config.storage = StorageConfig::default();
    config
}

/// Cheapest bcrypt cost, keeps the suite fast
pub fn hash(password: &str) -> String {
    bcrypt::hash(password, 4).expect("bcrypt hash")
}

pub fn seeded_admin() -> AdminUser {
    AdminUser::new(ADMIN_USERNAME.to_string(), hash(ADMIN_PASSWORD), AdminRole::SuperAdmin)
        .with_profile("admin@college.edu", "Site", "Admin")
        .with_managed_branches(vec![ObjectId::new(), ObjectId::new()])
}

fn build_state(config: AppConfig, users: Arc<dyn AdminUserStore>) -> (AppState, Arc<TokenService>) {
    let tokens = Arc::new(TokenService::new(&config.jwt));
    let state = AppState {
        auth: AuthService::new(users, tokens.clone()),
        storage: Arc::new(StorageService::new(&config.storage)),
        config: Arc::new(config),
    };
    (state, tokens)
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_config(test_config()).await
}

/// Test app whose upload routes accept at most `limit` bytes
pub async fn setup_test_app_with_upload_limit(limit: usize) -> TestApp {
    let mut config = test_config();
    config.storage.max_upload_bytes = limit;
    setup_test_app_with_config(config).await
}

async fn setup_test_app_with_config(config: AppConfig) -> TestApp {
    let store = Arc::new(InMemoryAdminUserStore::new());
    let admin_id = store.insert(seeded_admin()).await;

    let (state, tokens) = build_state(config, store.clone());

    TestApp {
        router: create_router(state),
        store,
        tokens,
        admin_id,
    }
}

/// Store whose every call fails like an unreachable database
pub struct FailingStore;

#[async_trait]
impl AdminUserStore for FailingStore {
    async fn find_active_by_username(&self, _username: &str) -> anyhow::Result<Option<AdminUser>> {
        Err(anyhow!("connection refused"))
    }

    async fn find_by_id(&self, _id: &ObjectId) -> anyhow::Result<Option<AdminUser>> {
        Err(anyhow!("connection refused"))
    }

    async fn record_login(&self, _id: &ObjectId, _at: DateTime) -> anyhow::Result<()> {
        Err(anyhow!("connection refused"))
    }
}

pub fn failing_router() -> (Router, Arc<TokenService>) {
    let (state, tokens) = build_state(test_config(), Arc::new(FailingStore));
    (create_router(state), tokens)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a raw body with an optional content type
pub async fn post_raw(app: &Router, uri: &str, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn get_with_token(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub const BOUNDARY: &str = "----sis-test-boundary";

/// Multipart body from `(field name, optional (file name, content type), data)`
pub fn multipart_body(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, token: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Log in as the seeded admin and return (access, refresh)
pub async fn login_tokens(app: &Router) -> (String, String) {
    let (status, body) = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    (
        body["tokens"]["accessToken"].as_str().unwrap().to_string(),
        body["tokens"]["refreshToken"].as_str().unwrap().to_string(),
    )
}
