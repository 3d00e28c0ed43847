//! Access/refresh token issuance.
//!
//! Access and refresh tokens are signed with different secrets, so neither
//! verifies as the other.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::JwtConfig, dto::auth::TokenPair};

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Admin user id (hex ObjectId)
    pub id: String,
    pub username: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub id: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    pub fn generate_tokens(&self, user_id: &str, username: &str) -> Result<TokenPair> {
        let now = Utc::now();

        let access = AccessClaims {
            id: user_id.to_string(),
            username: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        let refresh = RefreshClaims {
            id: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };

        Ok(TokenPair {
            access_token: encode(&Header::default(), &access, &self.access_encoding)?,
            refresh_token: encode(&Header::default(), &refresh, &self.refresh_encoding)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Option<AccessClaims> {
        match decode::<AccessClaims>(token, &self.access_decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Access token rejected: {}", e);
                None
            }
        }
    }

    /// `None` for expired, tampered or malformed tokens
    pub fn verify_refresh_token(&self, token: &str) -> Option<RefreshClaims> {
        match decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Refresh token rejected: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "access_secret_for_tests".to_string(),
            refresh_secret: "refresh_secret_for_tests".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        }
    }

    #[test]
    fn test_generate_tokens_round_trip() {
        let service = TokenService::new(&test_config());
        let pair = service.generate_tokens("64b7f0c2a1b2c3d4e5f60718", "admin").unwrap();

        assert_eq!(pair.access_token.split('.').count(), 3);
        assert_eq!(pair.refresh_token.split('.').count(), 3);

        let access = service.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(access.id, "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(access.username, "admin");

        let refresh = service.verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.id, "64b7f0c2a1b2c3d4e5f60718");
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let service = TokenService::new(&test_config());
        let pair = service.generate_tokens("abc", "admin").unwrap();

        assert!(service.verify_refresh_token(&pair.access_token).is_none());
        assert!(service.verify_access_token(&pair.refresh_token).is_none());
    }

    #[test]
    fn test_successive_pairs_differ() {
        let service = TokenService::new(&test_config());
        let first = service.generate_tokens("abc", "admin").unwrap();
        let second = service.generate_tokens("abc", "admin").unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let service = TokenService::new(&test_config());
        assert!(service.verify_refresh_token("invalid.token.here").is_none());
        assert!(service.verify_refresh_token("").is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new(&test_config());
        let other = TokenService::new(&JwtConfig {
            refresh_secret: "another_secret".to_string(),
            ..test_config()
        });

        let pair = issuer.generate_tokens("abc", "admin").unwrap();
        assert!(other.verify_refresh_token(&pair.refresh_token).is_none());
    }

    #[test]
    fn test_expired_refresh_token_rejected() {
        let config = test_config();
        let now = Utc::now();
        let claims = RefreshClaims {
            id: "abc".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
        )
        .unwrap();

        let service = TokenService::new(&config);
        assert!(service.verify_refresh_token(&token).is_none());
    }
}
