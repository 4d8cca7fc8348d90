//! 短码跳转
//!
//! 查找 → 过期检查 → 点击数 +1 → 跳转页（或 307）。

use std::sync::Arc;

use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, error, trace, warn};

use crate::config::{RedirectMode, get_config};
use crate::services::UrlService;
use crate::storage::ShortUrl;
use crate::utils::{format_url_for_display, is_valid_short_code};

use super::helpers::escape_html;

/// 跳转页展示的目标地址最大长度
const DISPLAY_URL_LENGTH: usize = 60;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<Arc<UrlService>>,
    ) -> HttpResponse {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            trace!("Invalid short code rejected: {}", code);
            return Self::message_page(StatusCode::NOT_FOUND, "Invalid short URL");
        }

        let url = match service.get_url_by_short_code(&code).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!("Short code not found: {}", code);
                return Self::message_page(StatusCode::NOT_FOUND, "This short URL does not exist");
            }
            Err(e) => {
                error!("Lookup failed during redirect for '{}': {}", code, e);
                return Self::message_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong while redirecting you",
                );
            }
        };

        if url.is_expired() {
            debug!("Expired short code visited: {}", code);
            return Self::message_page(StatusCode::GONE, "This short URL has expired");
        }

        // HEAD 只探测，不计点击
        if req.method() != Method::HEAD {
            match service.increment_url_clicks(&url.id).await {
                Ok(Some(updated)) => trace!("'{}' clicks now {}", code, updated.clicks),
                Ok(None) => {
                    // 别处（如 CLI）已删除，缓存里是旧数据
                    warn!("Short url '{}' vanished before click was counted", code);
                    service.invalidate_short_code(&code).await;
                    return Self::message_page(
                        StatusCode::NOT_FOUND,
                        "This short URL does not exist",
                    );
                }
                Err(e) => error!("Failed to count click for '{}': {}", code, e),
            }
        }

        Self::finish_redirect(&url)
    }

    fn finish_redirect(url: &ShortUrl) -> HttpResponse {
        let features = &get_config().features;

        match features.redirect_mode {
            RedirectMode::Direct => HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
                .insert_header(("Location", url.original_url.as_str()))
                .insert_header(("Cache-Control", "no-store"))
                .finish(),
            RedirectMode::Interstitial => HttpResponse::Ok()
                .insert_header(("Content-Type", "text/html; charset=utf-8"))
                .insert_header(("Cache-Control", "no-store"))
                .body(render_interstitial(url, features.redirect_delay_ms)),
        }
    }

    fn message_page(status: StatusCode, message: &str) -> HttpResponse {
        HttpResponse::build(status)
            .insert_header(("Content-Type", "text/html; charset=utf-8"))
            .insert_header(("Cache-Control", "no-store"))
            .body(render_message(message))
    }
}

/// 跳转过渡页：meta refresh 兜底，JS 定时跳转
pub fn render_interstitial(url: &ShortUrl, delay_ms: u64) -> String {
    let target = escape_html(&url.original_url);
    let display = escape_html(&format_url_for_display(&url.original_url, DISPLAY_URL_LENGTH));
    let title = url
        .title
        .as_deref()
        .map(|t| format!("<h1>{}</h1>", escape_html(t)))
        .unwrap_or_else(|| "<h1>Redirecting…</h1>".to_string());
    // JSON 字符串字面量可以直接嵌入脚本；再转义 `<` 防止提前闭合 script 标签
    let target_js = serde_json::to_string(&url.original_url)
        .unwrap_or_else(|_| "\"/\"".to_string())
        .replace('<', "\\u003c");
    let delay_secs = delay_ms.div_ceil(1000);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta http-equiv="refresh" content="{delay_secs}; url={target}">
<title>Redirecting…</title>
</head>
<body>
<main>
{title}
<p>You are being redirected to</p>
<p><a href="{target}" rel="noopener noreferrer">{display}</a></p>
</main>
<script>setTimeout(function () {{ window.location.href = {target_js}; }}, {delay_ms});</script>
</body>
</html>"#
    )
}

fn render_message(message: &str) -> String {
    let message = escape_html(message);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{message}</title>
</head>
<body>
<main>
<h1>{message}</h1>
<p><a href="/">Go to homepage</a></p>
</main>
</body>
</html>"#
    )
}

/// 跳转路由：`/r/{code}` 与 `/{code}`，需在页面路由之后注册
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/r/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/r/{code}", web::head().to(RedirectService::handle_redirect))
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(original_url: &str, title: Option<&str>) -> ShortUrl {
        let now = Utc::now();
        ShortUrl {
            id: "id".to_string(),
            user_id: "u".to_string(),
            original_url: original_url.to_string(),
            short_code: "abc123".to_string(),
            title: title.map(str::to_string),
            clicks: 0,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_interstitial_contains_target_and_delay() {
        let html = render_interstitial(&sample("https://example.com/a?b=1&c=2", None), 1500);

        assert!(html.contains(r#"content="2; url=https://example.com/a?b=1&amp;c=2""#));
        assert!(html.contains("window.location.href = \"https://example.com/a?b=1&c=2\""));
        assert!(html.contains("}, 1500);"));
    }

    #[test]
    fn test_interstitial_escapes_title_and_script() {
        let html = render_interstitial(
            &sample("https://example.com/</script>", Some("<b>hi</b>")),
            1000,
        );

        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(!html.contains("<b>hi</b>"));
        assert!(html.contains("\\u003c/script>"));
    }
}
