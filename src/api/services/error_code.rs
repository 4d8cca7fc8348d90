//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::SnappyError;

/// API 错误码
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 短链错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 认证错误
    AuthFailed = 2000,
    TokenInvalid = 2002,
    RateLimitExceeded = 2004,
    UserAlreadyExists = 2005,

    // 短链错误
    UrlNotFound = 3000,
    ShortCodeTaken = 3001,
    InvalidUrl = 3002,
    InvalidShortCode = 3003,
    ReservedShortCode = 3004,
    UrlDatabaseError = 3005,
}

impl From<&SnappyError> for ErrorCode {
    fn from(err: &SnappyError) -> Self {
        match err {
            SnappyError::Validation(_) => ErrorCode::BadRequest,
            SnappyError::NotFound(_) => ErrorCode::UrlNotFound,
            SnappyError::InvalidUrl(_) => ErrorCode::InvalidUrl,
            SnappyError::InvalidShortCode(_) => ErrorCode::InvalidShortCode,
            SnappyError::ReservedShortCode(_) => ErrorCode::ReservedShortCode,
            SnappyError::ShortCodeTaken(_) => ErrorCode::ShortCodeTaken,
            SnappyError::UserAlreadyExists(_) => ErrorCode::UserAlreadyExists,
            SnappyError::InvalidCredentials(_) => ErrorCode::AuthFailed,
            SnappyError::Unauthorized(_) => ErrorCode::TokenInvalid,
            SnappyError::DatabaseOperation(_) => ErrorCode::UrlDatabaseError,
            SnappyError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            SnappyError::DatabaseConfig(_)
            | SnappyError::FileOperation(_)
            | SnappyError::Serialization(_)
            | SnappyError::TokenCreation(_)
            | SnappyError::PasswordHash(_) => ErrorCode::InternalServerError,
        }
    }
}
