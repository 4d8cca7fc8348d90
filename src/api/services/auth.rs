//! 认证相关端点：注册、登录、刷新、登出、当前用户

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use governor::middleware::NoOpMiddleware;
use tracing::{debug, info, warn};

use crate::api::constants;
use crate::api::jwt::get_jwt_service;
use crate::api::middleware::AuthenticatedUser;
use crate::config::get_config;
use crate::errors::SnappyError;
use crate::services::AuthService;
use crate::storage::User;

use super::error_code::ErrorCode;
use super::helpers::{CookieBuilder, error_from_snappy, error_response, json_response};
use super::types::{
    AuthPayload, Credentials, MessageResponse, RefreshRequest, TokenPayload, UserView,
};

/// 按连接 IP 限流
///
/// 拿不到 peer 地址时（例如 Unix socket、测试请求）所有请求共用一个桶。
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let key = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown-peer".to_string());
        Ok(key)
    }
}

/// 登录/注册限流器，超限返回 429
pub fn login_rate_limiter() -> Governor<LoginKeyExtractor, NoOpMiddleware> {
    let auth = &get_config().auth;
    let seconds = auth.login_seconds_per_request.max(1);
    let burst = auth.login_burst_size.max(1);

    // 参数已保证非零，finish 不会失败
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(seconds)
        .burst_size(burst)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!(
        "Login rate limiter created: 1 req/{}s, burst {}",
        seconds, burst
    );
    Governor::new(&config)
}

/// 签发一对 token 并写入 cookie
fn session_response(status: StatusCode, user: &User, message: &str) -> HttpResponse {
    let jwt = get_jwt_service();
    let tokens = jwt
        .generate_access_token(&user.id)
        .and_then(|access| Ok((access, jwt.generate_refresh_token(&user.id)?)));

    let (access_token, refresh_token) = match tokens {
        Ok(pair) => pair,
        Err(e) => return error_from_snappy(&e),
    };

    let cookies = CookieBuilder::from_config();
    let payload = AuthPayload {
        user: UserView::from(user),
        access_token: access_token.clone(),
        refresh_token: refresh_token.clone(),
        expires_in: cookies.access_token_seconds(),
    };

    let mut resp = json_response(status, ErrorCode::Success, message, Some(payload));
    for cookie in [
        cookies.access_cookie(access_token),
        cookies.refresh_cookie(refresh_token),
    ] {
        if let Err(e) = resp.add_cookie(&cookie) {
            warn!("Failed to attach auth cookie: {}", e);
        }
    }
    resp
}

pub async fn register(
    service: web::Data<Arc<AuthService>>,
    body: web::Json<Credentials>,
) -> HttpResponse {
    match service.sign_up(&body.email, &body.password).await {
        Ok(user) => {
            info!("API: user {} registered", user.id);
            session_response(StatusCode::CREATED, &user, "Account created")
        }
        Err(e) => error_from_snappy(&e),
    }
}

pub async fn login(
    service: web::Data<Arc<AuthService>>,
    body: web::Json<Credentials>,
) -> HttpResponse {
    match service.sign_in(&body.email, &body.password).await {
        Ok(user) => session_response(StatusCode::OK, &user, "Login successful"),
        Err(e) => error_from_snappy(&e),
    }
}

/// 用 refresh token 换新的 access token（cookie 优先，其次请求体）
pub async fn refresh(
    req: HttpRequest,
    service: web::Data<Arc<AuthService>>,
    body: Option<web::Json<RefreshRequest>>,
) -> HttpResponse {
    let token = req
        .cookie(constants::REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token))
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::TokenInvalid,
            "Refresh token not found",
        );
    };

    let jwt = get_jwt_service();
    let claims = match jwt.validate_refresh_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("API: invalid refresh token: {}", e);
            return error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::TokenInvalid,
                "Invalid refresh token",
            );
        }
    };

    // 账户可能已被删除
    match service.get_user(&claims.sub).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::TokenInvalid,
                "Account no longer exists",
            );
        }
        Err(e) => return error_from_snappy(&e),
    }

    let access_token = match jwt.generate_access_token(&claims.sub) {
        Ok(token) => token,
        Err(e) => return error_from_snappy(&e),
    };

    let cookies = CookieBuilder::from_config();
    let payload = TokenPayload {
        access_token: access_token.clone(),
        expires_in: cookies.access_token_seconds(),
    };
    let mut resp = json_response(StatusCode::OK, ErrorCode::Success, "Token refreshed", Some(payload));
    if let Err(e) = resp.add_cookie(&cookies.access_cookie(access_token)) {
        warn!("Failed to attach access cookie: {}", e);
    }
    resp
}

pub async fn logout() -> HttpResponse {
    let cookies = CookieBuilder::from_config();
    HttpResponse::Ok()
        .cookie(cookies.expired_access_cookie())
        .cookie(cookies.expired_refresh_cookie())
        .json(super::types::ApiResponse {
            code: ErrorCode::Success as i32,
            message: "OK".to_string(),
            data: Some(MessageResponse {
                message: "Logged out".to_string(),
            }),
        })
}

pub async fn me(user: AuthenticatedUser, service: web::Data<Arc<AuthService>>) -> HttpResponse {
    match service.get_user(&user.id).await {
        Ok(Some(found)) => super::helpers::success_response(UserView::from(&found)),
        Ok(None) => error_from_snappy(&SnappyError::unauthorized("Account no longer exists")),
        Err(e) => error_from_snappy(&e),
    }
}

/// `/auth` 路由；登录与注册各自按 IP 限流
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .service(
            web::resource("/register")
                .wrap(login_rate_limiter())
                .route(web::post().to(register)),
        )
        .service(
            web::resource("/login")
                .wrap(login_rate_limiter())
                .route(web::post().to(login)),
        )
        .route("/refresh", web::post().to(refresh))
        .route("/logout", web::post().to(logout))
        .route("/me", web::get().to(me))
}
