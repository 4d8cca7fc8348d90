use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

use crate::errors::SnappyError;

static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// 全局 JwtService，首次使用时按配置初始化
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// Token claims，`sub` 为用户 id
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: u64,
    refresh_token_days: u64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_minutes: u64, refresh_token_days: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
            refresh_token_days,
        }
    }

    pub fn from_config() -> Self {
        let auth = &crate::config::get_config().auth;

        // 未配置时生成随机密钥，重启后所有会话失效
        let secret = if auth.jwt_secret.is_empty() {
            warn!("auth.jwt_secret is empty, generating a random secret; sessions will not survive restarts");
            crate::utils::generate_random_code(48)
        } else {
            auth.jwt_secret.clone()
        };

        Self::new(&secret, auth.access_token_minutes, auth.refresh_token_days)
    }

    pub fn access_token_minutes(&self) -> u64 {
        self.access_token_minutes
    }

    fn sign(&self, user_id: &str, token_type: &str, ttl: Duration) -> Result<String, SnappyError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SnappyError::token_creation(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str, expected_type: &str) -> Result<Claims, SnappyError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| SnappyError::unauthorized(format!("Invalid token: {}", e)))?;

        if data.claims.token_type != expected_type {
            return Err(SnappyError::unauthorized("Invalid token type"));
        }
        Ok(data.claims)
    }

    pub fn generate_access_token(&self, user_id: &str) -> Result<String, SnappyError> {
        self.sign(
            user_id,
            ACCESS,
            Duration::minutes(self.access_token_minutes as i64),
        )
    }

    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String, SnappyError> {
        self.sign(
            user_id,
            REFRESH,
            Duration::days(self.refresh_token_days as i64),
        )
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, SnappyError> {
        self.verify(token, ACCESS)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, SnappyError> {
        self.verify(token, REFRESH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("unit-test-secret-with-enough-bytes", 15, 7)
    }

    #[test]
    fn test_access_token_carries_user_id() {
        let jwt = service();
        let token = jwt.generate_access_token("user-42").unwrap();
        let claims = jwt.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.token_type, "access");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let jwt = service();
        let access = jwt.generate_access_token("u").unwrap();
        let refresh = jwt.generate_refresh_token("u").unwrap();

        assert!(jwt.validate_refresh_token(&access).is_err());
        assert!(jwt.validate_access_token(&refresh).is_err());
        assert!(jwt.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_foreign_or_garbage_tokens_rejected() {
        let other = JwtService::new("another-secret-entirely-different", 15, 7);
        let token = other.generate_access_token("u").unwrap();

        assert!(matches!(
            service().validate_access_token(&token),
            Err(SnappyError::Unauthorized(_))
        ));
        assert!(service().validate_access_token("not.a.jwt").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "u".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret-with-enough-bytes"),
        )
        .unwrap();

        assert!(service().validate_access_token(&token).is_err());
    }
}
