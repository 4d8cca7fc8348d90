//! 短链 CRUD 与统计端点

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;

use crate::api::middleware::{AuthenticatedUser, resolve_user};
use crate::services::{AuthService, UrlService};
use crate::storage::ShortUrl;

use super::helpers::{api_result, created_response, error_from_snappy, success_response};
use super::types::{CreateUrlBody, MessageResponse, StatsView, UpdateUrlBody, UrlView};

fn to_view(service: &UrlService, url: ShortUrl) -> UrlView {
    let short_url = service.short_url_for(&url.short_code);
    UrlView { url, short_url }
}

pub async fn list_urls(
    user: AuthenticatedUser,
    service: web::Data<Arc<UrlService>>,
) -> HttpResponse {
    let result = service.get_user_urls(&user.id).await.map(|urls| {
        urls.into_iter()
            .map(|url| to_view(&service, url))
            .collect::<Vec<_>>()
    });
    api_result(result)
}

pub async fn create_url(
    user: AuthenticatedUser,
    service: web::Data<Arc<UrlService>>,
    body: web::Json<CreateUrlBody>,
) -> HttpResponse {
    match service
        .create_short_url(&user.id, body.into_inner().into())
        .await
    {
        Ok(url) => {
            info!("API: created short code '{}'", url.short_code);
            created_response(to_view(&service, url))
        }
        Err(e) => error_from_snappy(&e),
    }
}

pub async fn get_url(
    user: AuthenticatedUser,
    service: web::Data<Arc<UrlService>>,
    path: web::Path<String>,
) -> HttpResponse {
    let result = service
        .get_user_url(&user.id, &path)
        .await
        .map(|url| to_view(&service, url));
    api_result(result)
}

pub async fn update_url(
    user: AuthenticatedUser,
    service: web::Data<Arc<UrlService>>,
    path: web::Path<String>,
    body: web::Json<UpdateUrlBody>,
) -> HttpResponse {
    let result = service
        .update_url(&user.id, &path, body.into_inner().into())
        .await
        .map(|url| to_view(&service, url));
    api_result(result)
}

pub async fn delete_url(
    user: AuthenticatedUser,
    service: web::Data<Arc<UrlService>>,
    path: web::Path<String>,
) -> HttpResponse {
    match service.delete_url(&user.id, &path).await {
        Ok(()) => success_response(MessageResponse {
            message: "Short URL deleted".to_string(),
        }),
        Err(e) => error_from_snappy(&e),
    }
}

/// 社区统计；带有效凭证时附带调用者自己的链接数与点击数
pub async fn stats(
    req: HttpRequest,
    auth_service: web::Data<Arc<AuthService>>,
    url_service: web::Data<Arc<UrlService>>,
) -> HttpResponse {
    let total_users = match auth_service.total_users().await {
        Ok(n) => n,
        Err(e) => return error_from_snappy(&e),
    };

    let mut view = StatsView {
        total_users,
        ..Default::default()
    };

    if let Some(user) = resolve_user(&req) {
        match url_service.get_user_stats(&user.id).await {
            Ok(own) => {
                view.links = Some(own.links);
                view.clicks = Some(own.clicks);
            }
            Err(e) => return error_from_snappy(&e),
        }
    }

    success_response(view)
}

/// `/urls` 路由；挂载时需包一层 `UserAuth`
pub fn url_routes() -> actix_web::Scope {
    web::scope("/urls")
        .route("", web::get().to(list_urls))
        .route("", web::post().to(create_url))
        .route("/{id}", web::get().to(get_url))
        .route("/{id}", web::put().to(update_url))
        .route("/{id}", web::delete().to(delete_url))
}
