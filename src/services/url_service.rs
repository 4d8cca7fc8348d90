//! Short URL management service
//!
//! Business logic for creating, resolving, editing and deleting short URLs,
//! shared between the HTTP handlers, the redirect service and the CLI.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::{debug, info, warn};

use crate::config::get_config;
use crate::errors::{Result, SnappyError};
use crate::storage::{GlobalStats, SeaOrmStorage, ShortUrl, UserLinkStats};
use crate::utils::time_parser::parse_expire_time;
use crate::utils::url_validator::validate_url;
use crate::utils::{generate_random_code, is_reserved_short_code, is_valid_short_code};

/// 标题最大长度（字符）
const MAX_TITLE_LENGTH: usize = 200;

const CUSTOM_CODE_TAKEN: &str = "This custom short code is already in use";

// ============ Request DTOs ============

/// Request to create a new short URL
#[derive(Debug, Clone, Default)]
pub struct CreateUrlRequest {
    pub original_url: String,
    /// Custom short code (generated when absent or empty)
    pub custom_code: Option<String>,
    pub title: Option<String>,
    /// RFC3339 timestamp or relative duration such as "7d"
    pub expires_at: Option<String>,
}

/// Request to edit an existing short URL
///
/// `None` keeps the current value; `title: Some("")` clears the title.
#[derive(Debug, Clone, Default)]
pub struct UpdateUrlRequest {
    pub original_url: Option<String>,
    pub short_code: Option<String>,
    pub title: Option<String>,
}

/// 查找缓存的过期策略：有过期时间的链接不会在缓存里活过它的 expires_at
struct LookupExpiry {
    default_ttl: Duration,
}

impl Expiry<String, ShortUrl> for LookupExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &ShortUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        let ttl = match value.expires_at {
            Some(expires_at) => {
                let remaining = (expires_at - Utc::now()).num_seconds().max(1) as u64;
                Duration::from_secs(remaining).min(self.default_ttl)
            }
            None => self.default_ttl,
        };
        Some(ttl)
    }
}

// ============ UrlService Implementation ============

pub struct UrlService {
    storage: Arc<SeaOrmStorage>,
    lookup_cache: Cache<String, ShortUrl>,
}

impl UrlService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let features = &get_config().features;
        let lookup_cache = Cache::builder()
            .max_capacity(features.lookup_cache_capacity)
            .expire_after(LookupExpiry {
                default_ttl: Duration::from_secs(features.lookup_cache_ttl.max(1)),
            })
            .build();

        debug!(
            "UrlService lookup cache: capacity {}, ttl {}s",
            features.lookup_cache_capacity, features.lookup_cache_ttl
        );
        Self {
            storage,
            lookup_cache,
        }
    }

    pub fn storage(&self) -> &Arc<SeaOrmStorage> {
        &self.storage
    }

    fn check_custom_code(code: &str) -> Result<()> {
        if !is_valid_short_code(code) {
            return Err(SnappyError::invalid_short_code(format!(
                "Invalid short code '{}'. Only letters, digits, '_' and '-' are allowed (max {} characters)",
                code,
                crate::utils::MAX_SHORT_CODE_LENGTH
            )));
        }
        if is_reserved_short_code(code) {
            return Err(SnappyError::reserved_short_code(format!(
                "Short code '{}' conflicts with a reserved route",
                code
            )));
        }
        Ok(())
    }

    fn normalize_title(title: Option<String>) -> Result<Option<String>> {
        match title.map(|t| t.trim().to_string()) {
            Some(t) if t.is_empty() => Ok(None),
            Some(t) if t.chars().count() > MAX_TITLE_LENGTH => Err(SnappyError::validation(
                format!("Title must be at most {} characters", MAX_TITLE_LENGTH),
            )),
            other => Ok(other),
        }
    }

    fn check_original_url(raw: &str) -> Result<String> {
        let trimmed = raw.trim();
        validate_url(trimmed).map_err(|e| SnappyError::invalid_url(e.to_string()))?;
        Ok(trimmed.to_string())
    }

    /// 丢弃查找缓存中的短码
    pub async fn invalidate_short_code(&self, code: &str) {
        self.lookup_cache.invalidate(code).await;
    }

    // ============ Operations ============

    /// 创建短链
    ///
    /// 自定义短码冲突直接报错；随机短码冲突时重新生成，最多
    /// `features.code_generation_attempts` 次。
    pub async fn create_short_url(&self, user_id: &str, req: CreateUrlRequest) -> Result<ShortUrl> {
        let original_url = Self::check_original_url(&req.original_url)?;
        let title = Self::normalize_title(req.title)?;

        let expires_at = match req.expires_at.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => {
                let at = parse_expire_time(s).map_err(SnappyError::validation)?;
                if at <= Utc::now() {
                    return Err(SnappyError::validation(
                        "Expiration time must be in the future",
                    ));
                }
                Some(at)
            }
            _ => None,
        };

        let custom_code = req
            .custom_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(code) = &custom_code {
            Self::check_custom_code(code)?;
        }

        let features = &get_config().features;
        let attempts = if custom_code.is_some() {
            1
        } else {
            features.code_generation_attempts.max(1)
        };

        for attempt in 1..=attempts {
            let code = match &custom_code {
                Some(c) => c.clone(),
                None => generate_random_code(features.random_code_length),
            };

            if custom_code.is_none() && is_reserved_short_code(&code) {
                continue;
            }

            if self.storage.code_exists(&code, None).await? {
                if custom_code.is_some() {
                    return Err(SnappyError::short_code_taken(CUSTOM_CODE_TAKEN));
                }
                warn!(
                    "Generated short code '{}' collided (attempt {}/{})",
                    code, attempt, attempts
                );
                continue;
            }

            let now = Utc::now();
            let url = ShortUrl {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                original_url: original_url.clone(),
                short_code: code,
                title: title.clone(),
                clicks: 0,
                expires_at,
                created_at: now,
                updated_at: now,
            };

            // 预检查与插入之间仍可能被抢占，由唯一索引兜底
            match self.storage.insert_url(&url).await {
                Ok(()) => {
                    info!(
                        "UrlService: user {} created '{}' -> '{}'",
                        user_id, url.short_code, url.original_url
                    );
                    return Ok(url);
                }
                Err(SnappyError::ShortCodeTaken(_)) if custom_code.is_some() => {
                    return Err(SnappyError::short_code_taken(CUSTOM_CODE_TAKEN));
                }
                Err(SnappyError::ShortCodeTaken(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(SnappyError::short_code_taken(format!(
            "Could not generate a unique short code after {} attempts, please try again",
            attempts
        )))
    }

    /// 用户的全部短链，最新在前
    pub async fn get_user_urls(&self, user_id: &str) -> Result<Vec<ShortUrl>> {
        self.storage.list_urls_by_user(user_id).await
    }

    /// 按 id 获取用户自己的短链
    pub async fn get_user_url(&self, user_id: &str, id: &str) -> Result<ShortUrl> {
        self.storage
            .get_url_by_id(id)
            .await?
            .filter(|url| url.user_id == user_id)
            .ok_or_else(|| SnappyError::not_found(format!("Url not found: {}", id)))
    }

    /// 跳转用查找，经过缓存
    pub async fn get_url_by_short_code(&self, code: &str) -> Result<Option<ShortUrl>> {
        if let Some(hit) = self.lookup_cache.get(code).await {
            return Ok(Some(hit));
        }

        let found = self.storage.get_url_by_code(code).await?;
        if let Some(url) = &found {
            self.lookup_cache
                .insert(url.short_code.clone(), url.clone())
                .await;
        }
        Ok(found)
    }

    pub async fn increment_url_clicks(&self, id: &str) -> Result<Option<ShortUrl>> {
        self.storage.increment_clicks(id).await
    }

    /// 修改短链；非本人的链接按不存在处理
    pub async fn update_url(
        &self,
        user_id: &str,
        id: &str,
        req: UpdateUrlRequest,
    ) -> Result<ShortUrl> {
        let mut url = self.get_user_url(user_id, id).await?;
        let old_code = url.short_code.clone();

        if let Some(original_url) = req.original_url {
            url.original_url = Self::check_original_url(&original_url)?;
        }

        if let Some(code) = req.short_code.map(|c| c.trim().to_string()) {
            if code != url.short_code {
                Self::check_custom_code(&code)?;
                if self.storage.code_exists(&code, Some(id)).await? {
                    return Err(SnappyError::short_code_taken(CUSTOM_CODE_TAKEN));
                }
                url.short_code = code;
            }
        }

        if req.title.is_some() {
            url.title = Self::normalize_title(req.title)?;
        }

        url.updated_at = Utc::now();
        let updated = self.storage.update_url(&url).await?;

        self.invalidate_short_code(&old_code).await;
        if updated.short_code != old_code {
            self.invalidate_short_code(&updated.short_code).await;
        }

        info!("UrlService: user {} updated url {}", user_id, id);
        Ok(updated)
    }

    pub async fn delete_url(&self, user_id: &str, id: &str) -> Result<()> {
        let url = self.get_user_url(user_id, id).await?;

        if !self.storage.delete_url(&url.id).await? {
            return Err(SnappyError::not_found(format!("Url not found: {}", id)));
        }
        self.invalidate_short_code(&url.short_code).await;

        info!("UrlService: user {} deleted '{}'", user_id, url.short_code);
        Ok(())
    }

    pub async fn get_user_stats(&self, user_id: &str) -> Result<UserLinkStats> {
        self.storage.user_link_stats(user_id).await
    }

    /// 完整短链地址 `{public_base_url}/r/{code}`
    pub fn short_url_for(&self, code: &str) -> String {
        let base = &get_config().features.public_base_url;
        format!("{}/r/{}", base.trim_end_matches('/'), code)
    }

    // ============ Admin (CLI) ============

    pub async fn list_all_urls(&self) -> Result<Vec<ShortUrl>> {
        self.storage.list_all_urls().await
    }

    pub async fn remove_by_code(&self, code: &str) -> Result<()> {
        if !self.storage.delete_url_by_code(code).await? {
            return Err(SnappyError::not_found(format!(
                "Short code '{}' does not exist",
                code
            )));
        }
        self.invalidate_short_code(code).await;
        Ok(())
    }

    pub async fn global_stats(&self) -> Result<GlobalStats> {
        self.storage.global_stats().await
    }
}
