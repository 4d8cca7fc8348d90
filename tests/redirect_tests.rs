//! Redirect service tests
//!
//! Short code → interstitial page, with exactly one click counted per visit.

use std::sync::{Arc, Once};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{Duration, Utc};

use snappylink::api::services::redirect_routes;
use snappylink::config::init_config;
use snappylink::services::{AuthService, CreateUrlRequest, UrlService};
use snappylink::storage::{SeaOrmStorage, ShortUrl};
use tempfile::TempDir;

// =============================================================================
// Test Setup
// =============================================================================

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

struct TestEnv {
    _dir: TempDir,
    storage: Arc<SeaOrmStorage>,
    urls: Arc<UrlService>,
    user_id: String,
}

async fn setup() -> TestEnv {
    init_static_config();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("redirect_test.db").display()
    );
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    let user_id = AuthService::new(storage.clone())
        .sign_up("visitor@example.com", "s3cret-password")
        .await
        .expect("sign up failed")
        .id;

    TestEnv {
        _dir: dir,
        urls: Arc::new(UrlService::new(storage.clone())),
        storage,
        user_id,
    }
}

async fn create(env: &TestEnv, code: &str, target: &str) -> ShortUrl {
    env.urls
        .create_short_url(
            &env.user_id,
            CreateUrlRequest {
                original_url: target.to_string(),
                custom_code: Some(code.to_string()),
                title: Some("Docs <home>".to_string()),
                expires_at: None,
            },
        )
        .await
        .expect("create failed")
}

async fn clicks(env: &TestEnv, id: &str) -> u64 {
    env.storage
        .get_url_by_id(id)
        .await
        .unwrap()
        .expect("url should exist")
        .clicks
}

macro_rules! redirect_app {
    ($env:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($env.urls.clone()))
                .service(redirect_routes()),
        )
        .await
    };
}

// =============================================================================
// Tests
// =============================================================================

#[actix_web::test]
async fn test_unknown_code_returns_404_page() {
    let env = setup().await;
    let app = redirect_app!(env);

    let req = TestRequest::get().uri("/r/nope42").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("This short URL does not exist"));
}

#[actix_web::test]
async fn test_invalid_code_returns_404_page() {
    let env = setup().await;
    let app = redirect_app!(env);

    let req = TestRequest::get().uri("/r/bad%20code").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Invalid short URL"));
}

#[actix_web::test]
async fn test_known_code_counts_exactly_one_click() {
    let env = setup().await;
    let url = create(&env, "docs01", "https://example.com/docs").await;
    let app = redirect_app!(env);

    let req = TestRequest::get().uri("/r/docs01").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("https://example.com/docs"));
    assert!(html.contains("http-equiv=\"refresh\""));
    assert!(html.contains("window.location.href"));
    // 标题需要转义
    assert!(html.contains("Docs &lt;home&gt;"));
    assert!(!html.contains("Docs <home>"));

    assert_eq!(clicks(&env, &url.id).await, 1);

    // 第二次访问再 +1
    let req = TestRequest::get().uri("/docs01").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(clicks(&env, &url.id).await, 2);
}

#[actix_web::test]
async fn test_head_does_not_count_click() {
    let env = setup().await;
    let url = create(&env, "head01", "https://example.com/head").await;
    let app = redirect_app!(env);

    let req = TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri("/r/head01")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(clicks(&env, &url.id).await, 0);
}

#[actix_web::test]
async fn test_expired_code_returns_410_without_click() {
    let env = setup().await;
    let now = Utc::now();
    let expired = ShortUrl {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: env.user_id.clone(),
        original_url: "https://example.com/old".to_string(),
        short_code: "gone01".to_string(),
        title: None,
        clicks: 0,
        expires_at: Some(now - Duration::hours(1)),
        created_at: now - Duration::days(2),
        updated_at: now - Duration::days(2),
    };
    env.storage.insert_url(&expired).await.unwrap();
    let app = redirect_app!(env);

    let req = TestRequest::get().uri("/r/gone01").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::GONE);

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("This short URL has expired"));

    assert_eq!(clicks(&env, &expired.id).await, 0);
}

#[actix_web::test]
async fn test_deleted_code_stops_redirecting() {
    let env = setup().await;
    let url = create(&env, "temp01", "https://example.com/tmp").await;
    let app = redirect_app!(env);

    let req = TestRequest::get().uri("/r/temp01").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    env.urls.delete_url(&env.user_id, &url.id).await.unwrap();

    let req = TestRequest::get().uri("/r/temp01").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_code_removed_by_another_service_returns_404() {
    let env = setup().await;
    create(&env, "stale1", "https://example.com/stale").await;
    let app = redirect_app!(env);

    // 第一次访问后进入服务端查找缓存
    let req = TestRequest::get().uri("/r/stale1").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // CLI 使用自己的 UrlService，清不到服务端缓存
    UrlService::new(env.storage.clone())
        .remove_by_code("stale1")
        .await
        .unwrap();
    assert!(env.storage.get_url_by_code("stale1").await.unwrap().is_none());

    let req = TestRequest::get().uri("/r/stale1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("This short URL does not exist"));

    // 缓存已失效，之后直接走数据库
    assert!(env.urls.get_url_by_short_code("stale1").await.unwrap().is_none());
}
