//! Cookie 名称与路由前缀

pub const ACCESS_COOKIE_NAME: &str = "snappy_access";

pub const REFRESH_COOKIE_NAME: &str = "snappy_refresh";

/// JSON API 前缀
pub const API_PREFIX: &str = "/api/v1";

/// Refresh cookie 只发往认证接口
pub const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";
