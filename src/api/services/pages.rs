//! 服务端渲染的最小页面壳

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::warn;

use crate::api::middleware::resolve_user;
use crate::services::AuthService;

use super::helpers::escape_html;

const APP_NAME: &str = "Snappy Link";

fn page(title: &str, body: &str) -> HttpResponse {
    let title = escape_html(title);
    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .body(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · {APP_NAME}</title>
</head>
<body>
<nav><a href="/">{APP_NAME}</a> · <a href="/dashboard">Dashboard</a> · <a href="/login">Log in</a> · <a href="/register">Sign up</a></nav>
<main>
{body}
</main>
</body>
</html>"#
        ))
}

/// 首页，附社区用户数
pub async fn index(service: web::Data<Arc<AuthService>>) -> HttpResponse {
    let community = match service.total_users().await {
        Ok(n) => format!("<p>Join {} people already shortening links.</p>", n),
        Err(e) => {
            warn!("Failed to load community stats: {}", e);
            String::new()
        }
    };

    page(
        "Shorten your links",
        &format!(
            "<h1>Shorten your links</h1>\n<p>Paste a long URL, get a short one, and watch the clicks roll in.</p>\n{}",
            community
        ),
    )
}

pub async fn login_page() -> HttpResponse {
    page(
        "Log in",
        "<h1>Log in</h1>\n<p>Sign in with <code>POST /api/v1/auth/login</code>.</p>",
    )
}

pub async fn register_page() -> HttpResponse {
    page(
        "Sign up",
        "<h1>Create an account</h1>\n<p>Register with <code>POST /api/v1/auth/register</code>.</p>",
    )
}

/// 未登录访问 dashboard 时跳到登录页
pub async fn dashboard(req: HttpRequest) -> HttpResponse {
    if resolve_user(&req).is_none() {
        return HttpResponse::Found()
            .insert_header(("Location", "/login"))
            .finish();
    }

    page(
        "Dashboard",
        "<h1>Your links</h1>\n<p>Your short URLs are served from <code>GET /api/v1/urls</code>.</p>",
    )
}

pub fn page_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/login", web::get().to(login_page))
        .route("/register", web::get().to(register_page))
        .route("/dashboard", web::get().to(dashboard));
}
