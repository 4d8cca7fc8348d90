//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::api::constants;
use crate::config::SameSitePolicy;
use crate::errors::SnappyError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, code, message, None)
}

/// SnappyError → HTTP 状态码 + 错误码；5xx 不向客户端暴露内部细节
pub fn error_from_snappy(err: &SnappyError) -> HttpResponse {
    let status = err.http_status();
    let code = ErrorCode::from(err);

    if status.is_server_error() {
        error!("API request failed: {}", err);
        error_response(status, code, "Internal server error")
    } else {
        error_response(status, code, err.message())
    }
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: Result<T, SnappyError>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_snappy(&e),
    }
}

/// 认证 cookie 构建器
pub struct CookieBuilder {
    same_site: SameSite,
    secure: bool,
    domain: Option<String>,
    access_token_minutes: u64,
    refresh_token_days: u64,
}

impl CookieBuilder {
    pub fn from_config() -> Self {
        let auth = &crate::config::get_config().auth;

        let same_site = match auth.cookie_same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::None => SameSite::None,
            SameSitePolicy::Lax => SameSite::Lax,
        };

        Self {
            same_site,
            secure: auth.cookie_secure,
            domain: auth.cookie_domain.clone(),
            access_token_minutes: auth.access_token_minutes,
            refresh_token_days: auth.refresh_token_days,
        }
    }

    fn build(&self, name: &'static str, value: String, path: &'static str, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path(path);
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(self.same_site);
        cookie.set_max_age(max_age);
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    pub fn access_cookie(&self, token: String) -> Cookie<'static> {
        self.build(
            constants::ACCESS_COOKIE_NAME,
            token,
            "/",
            Duration::minutes(self.access_token_minutes as i64),
        )
    }

    pub fn refresh_cookie(&self, token: String) -> Cookie<'static> {
        self.build(
            constants::REFRESH_COOKIE_NAME,
            token,
            constants::REFRESH_COOKIE_PATH,
            Duration::days(self.refresh_token_days as i64),
        )
    }

    pub fn expired_access_cookie(&self) -> Cookie<'static> {
        self.build(constants::ACCESS_COOKIE_NAME, String::new(), "/", Duration::ZERO)
    }

    pub fn expired_refresh_cookie(&self) -> Cookie<'static> {
        self.build(
            constants::REFRESH_COOKIE_NAME,
            String::new(),
            constants::REFRESH_COOKIE_PATH,
            Duration::ZERO,
        )
    }

    pub fn access_token_seconds(&self) -> u64 {
        self.access_token_minutes * 60
    }
}

/// HTML 转义，用于服务端渲染的页面
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
