use anyhow::Context;
use mongodb::bson::{oid::ObjectId, DateTime};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    dto::auth::TokenPair,
    error::{AppError, AppResult},
    models::user::AdminUser,
    services::{token::TokenService, user_store::AdminUserStore},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login and token refresh against the admin credential store
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn AdminUserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn AdminUserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Verify credentials, issue a token pair and stamp `lastLogin`.
    ///
    /// Returns the user as it is after the login was recorded.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(TokenPair, AdminUser)> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let mut user = match self.users.find_active_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!("Login rejected for unknown or inactive user: {}", username);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(password, &user.password_hash).await? {
            warn!("Login rejected for {}: password mismatch", username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let id = user.id.context("admin user record has no _id")?;
        let tokens = self.tokens.generate_tokens(&id.to_hex(), &user.username)?;

        let now = DateTime::now();
        self.users.record_login(&id, now).await?;
        user.last_login = Some(now);

        info!("Admin user logged in: {}", user.username);
        Ok((tokens, user))
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        if refresh_token.is_empty() {
            return Err(AppError::Validation("Refresh token is required".to_string()));
        }

        let claims = self
            .tokens
            .verify_refresh_token(refresh_token)
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

        let user = self
            .load_active_user(&claims.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found or inactive".to_string()))?;

        let tokens = self.tokens.generate_tokens(&claims.id, &user.username)?;
        Ok(tokens)
    }

    /// Resolve the user behind a verified access token
    pub async fn authenticate_access_token(&self, token: &str) -> AppResult<AdminUser> {
        let claims = self
            .tokens
            .verify_access_token(token)
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        self.load_active_user(&claims.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found or inactive".to_string()))
    }

    /// `Ok(None)` when the id is malformed, unknown, or the user is inactive
    async fn load_active_user(&self, id: &str) -> AppResult<Option<AdminUser>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let user = self.users.find_by_id(&object_id).await?;
        Ok(user.filter(|u| u.is_active))
    }
}

/// Runs the bcrypt comparison on the blocking pool
async fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            // an unparseable stored hash can never match
            warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}
