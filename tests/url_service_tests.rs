//! UrlService 集成测试
//!
//! 每个测试使用独立的 SQLite 临时库。

use std::sync::{Arc, Once};

use snappylink::config::init_config;
use snappylink::errors::SnappyError;
use snappylink::services::{AuthService, CreateUrlRequest, UpdateUrlRequest, UrlService};
use snappylink::storage::{SeaOrmStorage, ShortUrl};
use tempfile::TempDir;

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

struct TestEnv {
    _dir: TempDir,
    storage: Arc<SeaOrmStorage>,
    urls: UrlService,
    auth: AuthService,
}

async fn setup() -> TestEnv {
    init_static_config();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("urls.db").display());
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    TestEnv {
        _dir: dir,
        urls: UrlService::new(storage.clone()),
        auth: AuthService::new(storage.clone()),
        storage,
    }
}

async fn new_user(env: &TestEnv, email: &str) -> String {
    env.auth
        .sign_up(email, "correct horse battery")
        .await
        .expect("sign up failed")
        .id
}

fn create_req(url: &str, code: Option<&str>) -> CreateUrlRequest {
    CreateUrlRequest {
        original_url: url.to_string(),
        custom_code: code.map(str::to_string),
        title: None,
        expires_at: None,
    }
}

#[tokio::test]
async fn test_create_generates_six_char_code() {
    let env = setup().await;
    let user = new_user(&env, "gen@example.com").await;

    let url = env
        .urls
        .create_short_url(&user, create_req("https://example.com/a/long/path", None))
        .await
        .unwrap();

    assert_eq!(url.short_code.len(), 6);
    assert!(url.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(url.clicks, 0);
    assert_eq!(url.user_id, user);

    let fetched = env
        .urls
        .get_url_by_short_code(&url.short_code)
        .await
        .unwrap()
        .expect("created url should be retrievable");
    assert_eq!(fetched.original_url, "https://example.com/a/long/path");
    assert_eq!(fetched.clicks, 0);
}

#[tokio::test]
async fn test_duplicate_custom_code_rejected() {
    let env = setup().await;
    let alice = new_user(&env, "alice@example.com").await;
    let bob = new_user(&env, "bob@example.com").await;

    env.urls
        .create_short_url(&alice, create_req("https://example.com", Some("mycode")))
        .await
        .unwrap();

    let err = env
        .urls
        .create_short_url(&bob, create_req("https://example.org", Some("mycode")))
        .await
        .unwrap_err();
    assert!(matches!(err, SnappyError::ShortCodeTaken(_)));
    assert!(err.message().contains("already in use"));
}

#[tokio::test]
async fn test_invalid_inputs_rejected() {
    let env = setup().await;
    let user = new_user(&env, "inv@example.com").await;

    let err = env
        .urls
        .create_short_url(&user, create_req("javascript:alert(1)", None))
        .await
        .unwrap_err();
    assert!(matches!(err, SnappyError::InvalidUrl(_)));

    let err = env
        .urls
        .create_short_url(&user, create_req("https://example.com", Some("bad code!")))
        .await
        .unwrap_err();
    assert!(matches!(err, SnappyError::InvalidShortCode(_)));

    let err = env
        .urls
        .create_short_url(&user, create_req("https://example.com", Some("dashboard")))
        .await
        .unwrap_err();
    assert!(matches!(err, SnappyError::ReservedShortCode(_)));

    let mut req = create_req("https://example.com", None);
    req.expires_at = Some("2000-01-01T00:00:00Z".to_string());
    let err = env.urls.create_short_url(&user, req).await.unwrap_err();
    assert!(matches!(err, SnappyError::Validation(_)));
}

#[tokio::test]
async fn test_relative_expiry_is_stored() {
    let env = setup().await;
    let user = new_user(&env, "exp@example.com").await;

    let mut req = create_req("https://example.com", None);
    req.expires_at = Some("1d".to_string());
    let url = env.urls.create_short_url(&user, req).await.unwrap();

    let expires_at = url.expires_at.expect("expiry should be set");
    assert!(expires_at > chrono::Utc::now() + chrono::Duration::hours(23));
    assert!(!url.is_expired());
}

#[tokio::test]
async fn test_increment_clicks_counts_each_call() {
    let env = setup().await;
    let user = new_user(&env, "clicks@example.com").await;
    let url = env
        .urls
        .create_short_url(&user, create_req("https://example.com", Some("clk001")))
        .await
        .unwrap();

    for expected in 1..=3 {
        let updated = env
            .urls
            .increment_url_clicks(&url.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.clicks, expected);
    }

    assert!(env.urls.increment_url_clicks("missing-id").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_increments_are_not_lost() {
    let env = setup().await;
    let user = new_user(&env, "race@example.com").await;
    let url = env
        .urls
        .create_short_url(&user, create_req("https://example.com", Some("race01")))
        .await
        .unwrap();

    let urls = Arc::new(UrlService::new(env.storage.clone()));
    let mut handles = Vec::new();
    for _ in 0..10 {
        let urls = urls.clone();
        let id = url.id.clone();
        handles.push(tokio::spawn(async move {
            urls.increment_url_clicks(&id).await.unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let stored = env.storage.get_url_by_id(&url.id).await.unwrap().unwrap();
    assert_eq!(stored.clicks, 10);
}

#[tokio::test]
async fn test_update_and_delete_are_owner_only() {
    let env = setup().await;
    let owner = new_user(&env, "owner@example.com").await;
    let other = new_user(&env, "other@example.com").await;
    let url = env
        .urls
        .create_short_url(&owner, create_req("https://example.com", Some("own001")))
        .await
        .unwrap();

    let req = UpdateUrlRequest {
        original_url: Some("https://evil.example".to_string()),
        short_code: None,
        title: None,
    };
    let err = env.urls.update_url(&other, &url.id, req).await.unwrap_err();
    assert!(matches!(err, SnappyError::NotFound(_)));

    let err = env.urls.delete_url(&other, &url.id).await.unwrap_err();
    assert!(matches!(err, SnappyError::NotFound(_)));

    let err = env.urls.get_user_url(&other, &url.id).await.unwrap_err();
    assert!(matches!(err, SnappyError::NotFound(_)));

    // 所有者仍然可以看到原始数据
    let mine = env.urls.get_user_url(&owner, &url.id).await.unwrap();
    assert_eq!(mine.original_url, "https://example.com");
}

#[tokio::test]
async fn test_update_changes_code_and_invalidates_lookup() {
    let env = setup().await;
    let user = new_user(&env, "upd@example.com").await;
    let url = env
        .urls
        .create_short_url(&user, create_req("https://example.com", Some("old001")))
        .await
        .unwrap();
    // 预热缓存
    assert!(env.urls.get_url_by_short_code("old001").await.unwrap().is_some());

    let req = UpdateUrlRequest {
        original_url: Some("https://example.org/new".to_string()),
        short_code: Some("new001".to_string()),
        title: Some("Fresh".to_string()),
    };
    let updated = env.urls.update_url(&user, &url.id, req).await.unwrap();
    assert_eq!(updated.short_code, "new001");
    assert_eq!(updated.title.as_deref(), Some("Fresh"));
    assert_eq!(updated.clicks, 0);

    assert!(env.urls.get_url_by_short_code("old001").await.unwrap().is_none());
    let fetched = env.urls.get_url_by_short_code("new001").await.unwrap().unwrap();
    assert_eq!(fetched.original_url, "https://example.org/new");
}

#[tokio::test]
async fn test_update_to_taken_code_rejected() {
    let env = setup().await;
    let user = new_user(&env, "taken@example.com").await;
    env.urls
        .create_short_url(&user, create_req("https://example.com", Some("first1")))
        .await
        .unwrap();
    let second = env
        .urls
        .create_short_url(&user, create_req("https://example.com", Some("second")))
        .await
        .unwrap();

    let req = UpdateUrlRequest {
        original_url: None,
        short_code: Some("first1".to_string()),
        title: None,
    };
    let err = env.urls.update_url(&user, &second.id, req).await.unwrap_err();
    assert!(matches!(err, SnappyError::ShortCodeTaken(_)));

    // 保持自身短码不算冲突
    let req = UpdateUrlRequest {
        original_url: None,
        short_code: Some("second".to_string()),
        title: None,
    };
    assert!(env.urls.update_url(&user, &second.id, req).await.is_ok());
}

#[tokio::test]
async fn test_delete_removes_link() {
    let env = setup().await;
    let user = new_user(&env, "del@example.com").await;
    let url = env
        .urls
        .create_short_url(&user, create_req("https://example.com", Some("del001")))
        .await
        .unwrap();
    assert!(env.urls.get_url_by_short_code("del001").await.unwrap().is_some());

    env.urls.delete_url(&user, &url.id).await.unwrap();

    assert!(env.urls.get_url_by_short_code("del001").await.unwrap().is_none());
    assert!(env.urls.get_user_urls(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_stats_and_listing() {
    let env = setup().await;
    let user = new_user(&env, "stats@example.com").await;
    let other = new_user(&env, "nobody@example.com").await;

    let a = env
        .urls
        .create_short_url(&user, create_req("https://example.com/a", Some("stat01")))
        .await
        .unwrap();
    env.urls
        .create_short_url(&user, create_req("https://example.com/b", Some("stat02")))
        .await
        .unwrap();
    env.urls.increment_url_clicks(&a.id).await.unwrap();
    env.urls.increment_url_clicks(&a.id).await.unwrap();

    let stats = env.urls.get_user_stats(&user).await.unwrap();
    assert_eq!(stats.links, 2);
    assert_eq!(stats.clicks, 2);

    let empty = env.urls.get_user_stats(&other).await.unwrap();
    assert_eq!(empty.links, 0);
    assert_eq!(empty.clicks, 0);

    let listed = env.urls.get_user_urls(&user).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(env.urls.get_user_urls(&other).await.unwrap().is_empty());

    let global = env.urls.global_stats().await.unwrap();
    assert_eq!(global.users, 2);
    assert_eq!(global.links, 2);
    assert_eq!(global.clicks, 2);
}

#[tokio::test]
async fn test_remove_by_code() {
    let env = setup().await;
    let user = new_user(&env, "cli@example.com").await;
    env.urls
        .create_short_url(&user, create_req("https://example.com", Some("cli001")))
        .await
        .unwrap();

    env.urls.remove_by_code("cli001").await.unwrap();
    assert!(env.urls.list_all_urls().await.unwrap().is_empty());

    let err = env.urls.remove_by_code("cli001").await.unwrap_err();
    assert!(matches!(err, SnappyError::NotFound(_)));
}

fn raw_url(user_id: &str, code: &str) -> ShortUrl {
    let now = chrono::Utc::now();
    ShortUrl {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        original_url: "https://example.com/raw".to_string(),
        short_code: code.to_string(),
        title: None,
        clicks: 0,
        expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_unique_index_rejects_duplicate_insert() {
    let env = setup().await;
    let user = new_user(&env, "index@example.com").await;

    // 直接写存储，跳过 code_exists 预检查
    env.storage.insert_url(&raw_url(&user, "dup001")).await.unwrap();
    let err = env
        .storage
        .insert_url(&raw_url(&user, "dup001"))
        .await
        .unwrap_err();
    assert!(matches!(err, SnappyError::ShortCodeTaken(_)));

    assert_eq!(env.storage.list_all_urls().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unique_index_rejects_update_onto_taken_code() {
    let env = setup().await;
    let user = new_user(&env, "index-upd@example.com").await;

    env.storage.insert_url(&raw_url(&user, "keep01")).await.unwrap();
    let mut other = raw_url(&user, "move01");
    env.storage.insert_url(&other).await.unwrap();

    other.short_code = "keep01".to_string();
    let err = env.storage.update_url(&other).await.unwrap_err();
    assert!(matches!(err, SnappyError::ShortCodeTaken(_)));

    let stored = env.storage.get_url_by_id(&other.id).await.unwrap().unwrap();
    assert_eq!(stored.short_code, "move01");
}
