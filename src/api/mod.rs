pub mod constants;
pub mod jwt;
pub mod middleware;
pub mod services;

use actix_web::web;

use middleware::UserAuth;
use services::{auth_routes, health_routes, page_routes, redirect_routes, url_routes};

/// 注册全部 HTTP 路由
///
/// 跳转路由的 `/{code}` 会匹配任意单段路径，必须最后注册。
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(constants::API_PREFIX)
            .service(auth_routes())
            .route("/stats", web::get().to(services::urls::stats))
            .service(url_routes().wrap(UserAuth)),
    )
    .service(health_routes())
    .configure(page_routes)
    .service(redirect_routes());
}
