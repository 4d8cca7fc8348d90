//! Account registration and credential checks

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::get_config;
use crate::errors::{Result, SnappyError};
use crate::storage::{SeaOrmStorage, User};
use crate::utils::password::{hash_password, verify_password};

/// RFC 5321 上限
const MAX_EMAIL_LENGTH: usize = 254;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// 邮箱统一小写并去除首尾空白
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str) -> Result<()> {
    let valid = email.len() <= MAX_EMAIL_LENGTH
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
        && !email.chars().any(char::is_whitespace);

    if valid {
        Ok(())
    } else {
        Err(SnappyError::validation("Please enter a valid email address"))
    }
}

pub struct AuthService {
    storage: Arc<SeaOrmStorage>,
}

impl AuthService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        check_email(&email)?;

        let min_len = get_config().features.min_password_length;
        if password.chars().count() < min_len {
            return Err(SnappyError::validation(format!(
                "Password must be at least {} characters",
                min_len
            )));
        }

        if self.storage.find_user_by_email(&email).await?.is_some() {
            return Err(SnappyError::user_already_exists(
                "An account with this email already exists",
            ));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };

        // 并发注册同一邮箱时由唯一索引兜底
        self.storage.insert_user(&user).await.map_err(|e| match e {
            SnappyError::UserAlreadyExists(_) => {
                SnappyError::user_already_exists("An account with this email already exists")
            }
            other => other,
        })?;

        info!("AuthService: registered user {}", user.id);
        Ok(user)
    }

    /// 未知邮箱与错误密码返回同一个错误
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);

        let Some(user) = self.storage.find_user_by_email(&email).await? else {
            warn!("AuthService: login attempt for unknown email");
            return Err(SnappyError::invalid_credentials(INVALID_CREDENTIALS));
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("AuthService: wrong password for user {}", user.id);
            return Err(SnappyError::invalid_credentials(INVALID_CREDENTIALS));
        }

        info!("AuthService: user {} signed in", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.storage.get_user_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.storage
            .find_user_by_email(&normalize_email(email))
            .await
    }

    /// 社区统计：注册用户总数
    pub async fn total_users(&self) -> Result<u64> {
        self.storage.count_users().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("a@b.co").is_ok());
        assert!(check_email("no-at-sign").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("user@").is_err());
        assert!(check_email("a b@c.d").is_err());
        assert!(check_email(&format!("{}@x.io", "a".repeat(260))).is_err());
    }
}
