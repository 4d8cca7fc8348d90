use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum SnappyError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Validation(String),
    NotFound(String),
    InvalidUrl(String),
    InvalidShortCode(String),
    ReservedShortCode(String),
    ShortCodeTaken(String),
    UserAlreadyExists(String),
    InvalidCredentials(String),
    Unauthorized(String),
    TokenCreation(String),
    PasswordHash(String),
}

impl SnappyError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SnappyError::DatabaseConfig(_) => "E001",
            SnappyError::DatabaseConnection(_) => "E002",
            SnappyError::DatabaseOperation(_) => "E003",
            SnappyError::FileOperation(_) => "E004",
            SnappyError::Serialization(_) => "E005",
            SnappyError::Validation(_) => "E006",
            SnappyError::NotFound(_) => "E007",
            SnappyError::InvalidUrl(_) => "E008",
            SnappyError::InvalidShortCode(_) => "E009",
            SnappyError::ReservedShortCode(_) => "E010",
            SnappyError::ShortCodeTaken(_) => "E011",
            SnappyError::UserAlreadyExists(_) => "E012",
            SnappyError::InvalidCredentials(_) => "E013",
            SnappyError::Unauthorized(_) => "E014",
            SnappyError::TokenCreation(_) => "E015",
            SnappyError::PasswordHash(_) => "E016",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SnappyError::DatabaseConfig(_) => "Database Configuration Error",
            SnappyError::DatabaseConnection(_) => "Database Connection Error",
            SnappyError::DatabaseOperation(_) => "Database Operation Error",
            SnappyError::FileOperation(_) => "File Operation Error",
            SnappyError::Serialization(_) => "Serialization Error",
            SnappyError::Validation(_) => "Validation Error",
            SnappyError::NotFound(_) => "Resource Not Found",
            SnappyError::InvalidUrl(_) => "Invalid URL",
            SnappyError::InvalidShortCode(_) => "Invalid Short Code",
            SnappyError::ReservedShortCode(_) => "Reserved Short Code",
            SnappyError::ShortCodeTaken(_) => "Short Code Taken",
            SnappyError::UserAlreadyExists(_) => "User Already Exists",
            SnappyError::InvalidCredentials(_) => "Invalid Credentials",
            SnappyError::Unauthorized(_) => "Unauthorized",
            SnappyError::TokenCreation(_) => "Token Creation Error",
            SnappyError::PasswordHash(_) => "Password Hash Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SnappyError::DatabaseConfig(msg)
            | SnappyError::DatabaseConnection(msg)
            | SnappyError::DatabaseOperation(msg)
            | SnappyError::FileOperation(msg)
            | SnappyError::Serialization(msg)
            | SnappyError::Validation(msg)
            | SnappyError::NotFound(msg)
            | SnappyError::InvalidUrl(msg)
            | SnappyError::InvalidShortCode(msg)
            | SnappyError::ReservedShortCode(msg)
            | SnappyError::ShortCodeTaken(msg)
            | SnappyError::UserAlreadyExists(msg)
            | SnappyError::InvalidCredentials(msg)
            | SnappyError::Unauthorized(msg)
            | SnappyError::TokenCreation(msg)
            | SnappyError::PasswordHash(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            SnappyError::Validation(_)
            | SnappyError::InvalidUrl(_)
            | SnappyError::InvalidShortCode(_)
            | SnappyError::ReservedShortCode(_) => StatusCode::BAD_REQUEST,
            SnappyError::NotFound(_) => StatusCode::NOT_FOUND,
            SnappyError::ShortCodeTaken(_) | SnappyError::UserAlreadyExists(_) => {
                StatusCode::CONFLICT
            }
            SnappyError::InvalidCredentials(_) | SnappyError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            SnappyError::DatabaseConfig(_)
            | SnappyError::DatabaseConnection(_)
            | SnappyError::DatabaseOperation(_)
            | SnappyError::FileOperation(_)
            | SnappyError::Serialization(_)
            | SnappyError::TokenCreation(_)
            | SnappyError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SnappyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SnappyError {}

// 便捷的构造函数
impl SnappyError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SnappyError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SnappyError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        SnappyError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SnappyError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SnappyError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SnappyError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SnappyError::NotFound(msg.into())
    }

    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        SnappyError::InvalidUrl(msg.into())
    }

    pub fn invalid_short_code<T: Into<String>>(msg: T) -> Self {
        SnappyError::InvalidShortCode(msg.into())
    }

    pub fn reserved_short_code<T: Into<String>>(msg: T) -> Self {
        SnappyError::ReservedShortCode(msg.into())
    }

    pub fn short_code_taken<T: Into<String>>(msg: T) -> Self {
        SnappyError::ShortCodeTaken(msg.into())
    }

    pub fn user_already_exists<T: Into<String>>(msg: T) -> Self {
        SnappyError::UserAlreadyExists(msg.into())
    }

    pub fn invalid_credentials<T: Into<String>>(msg: T) -> Self {
        SnappyError::InvalidCredentials(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        SnappyError::Unauthorized(msg.into())
    }

    pub fn token_creation<T: Into<String>>(msg: T) -> Self {
        SnappyError::TokenCreation(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        SnappyError::PasswordHash(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SnappyError {
    fn from(err: sea_orm::DbErr) -> Self {
        SnappyError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SnappyError {
    fn from(err: std::io::Error) -> Self {
        SnappyError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SnappyError {
    fn from(err: serde_json::Error) -> Self {
        SnappyError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnappyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            SnappyError::short_code_taken("x").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            SnappyError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SnappyError::invalid_credentials("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SnappyError::invalid_url("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SnappyError::database_operation("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = SnappyError::short_code_taken("This custom short code is already in use");
        assert_eq!(
            err.format_simple(),
            "Short Code Taken: This custom short code is already in use"
        );
        assert_eq!(err.to_string(), err.format_simple());
        assert_eq!(err.code(), "E011");
    }

    #[test]
    fn test_from_db_err() {
        let err: SnappyError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, SnappyError::DatabaseOperation(ref m) if m.contains("boom")));
    }
}
