//! 密码哈希工具模块
//!
//! 用户密码使用 Argon2id 哈希存储

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::SnappyError;

pub fn hash_password(password: &str) -> Result<String, SnappyError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SnappyError::password_hash(e.to_string()))
}

/// 校验明文密码；哈希本身无法解析时返回错误
pub fn verify_password(password: &str, hash: &str) -> Result<bool, SnappyError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| SnappyError::password_hash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
