//! 用户认证中间件
//!
//! 依次尝试 `Authorization: Bearer <access>` 和 access cookie，
//! 通过后把 [`AuthenticatedUser`] 放入 request extensions。

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, trace};

use crate::api::constants;
use crate::api::jwt::get_jwt_service;
use crate::api::services::{ApiResponse, ErrorCode};
use crate::errors::SnappyError;

/// 已认证的调用方
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 从请求中解析出当前用户；没有凭证或凭证无效时返回 None
///
/// Bearer 优先，失败后再看 cookie。
pub fn resolve_user(req: &HttpRequest) -> Option<AuthenticatedUser> {
    let jwt = get_jwt_service();

    let candidates = bearer_token(req)
        .into_iter()
        .chain(req.cookie(constants::ACCESS_COOKIE_NAME).map(|c| c.value().to_string()));

    for token in candidates {
        match jwt.validate_access_token(&token) {
            Ok(claims) => return Some(AuthenticatedUser { id: claims.sub }),
            Err(e) => debug!("Access token rejected: {}", e),
        }
    }
    None
}

fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::<()> {
            code: ErrorCode::Unauthorized as i32,
            message: "Unauthorized: Invalid or missing token".to_string(),
            data: None,
        })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    /// 优先读取中间件写入的结果，未经过中间件时直接校验 token
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let cached = req.extensions().get::<AuthenticatedUser>().cloned();
        let user = cached.or_else(|| resolve_user(req));

        ready(user.ok_or_else(|| {
            actix_web::error::InternalError::from_response(
                SnappyError::unauthorized("missing credentials"),
                unauthorized_response(),
            )
            .into()
        }))
    }
}

/// 保护一组路由：未认证请求直接返回 401
#[derive(Clone, Default)]
pub struct UserAuth;

impl<S, B> Transform<S, ServiceRequest> for UserAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = UserAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(UserAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct UserAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for UserAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            let Some(user) = resolve_user(req.request()) else {
                debug!("Authentication failed for {}", req.path());
                return Ok(req.into_response(unauthorized_response().map_into_right_body()));
            };

            trace!("Authenticated user {}", user.id);
            req.extensions_mut().insert(user);
            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}
