//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, ExprTrait, QueryFilter, sea_query::Expr,
};
use tracing::info;

use super::converters::{model_to_short_url, short_url_to_active_model, user_to_active_model};
use super::{SeaOrmStorage, is_unique_violation, retry};
use crate::errors::{Result, SnappyError};
use crate::storage::{ShortUrl, User};

use migration::entities::{short_url, user};

fn map_url_write_err(code: &str, e: DbErr) -> SnappyError {
    if is_unique_violation(&e) {
        SnappyError::short_code_taken(format!("Short code '{}' is already in use", code))
    } else {
        SnappyError::database_operation(format!("Failed to save url '{}': {}", code, e))
    }
}

impl SeaOrmStorage {
    /// 插入新链接；短码冲突返回 `ShortCodeTaken`
    pub async fn insert_url(&self, url: &ShortUrl) -> Result<()> {
        let db = &self.db;

        retry::with_retry(
            &format!("insert_url({})", url.short_code),
            self.retry_config,
            || short_url::Entity::insert(short_url_to_active_model(url, true)).exec(db),
        )
        .await
        .map_err(|e| map_url_write_err(&url.short_code, e))?;

        info!("Short url created: {} -> {}", url.short_code, url.original_url);
        Ok(())
    }

    /// 更新可编辑字段（原始链接、短码、标题、过期时间），不动点击数
    pub async fn update_url(&self, url: &ShortUrl) -> Result<ShortUrl> {
        let db = &self.db;

        let model = retry::with_retry(
            &format!("update_url({})", url.id),
            self.retry_config,
            || short_url_to_active_model(url, false).update(db),
        )
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                SnappyError::not_found(format!("Url not found: {}", url.id))
            }
            other => map_url_write_err(&url.short_code, other),
        })?;

        Ok(model_to_short_url(model))
    }

    /// 删除链接，返回是否真的删除了一行
    pub async fn delete_url(&self, id: &str) -> Result<bool> {
        let db = &self.db;
        let id_owned = id.to_string();

        let result = retry::with_retry(&format!("delete_url({})", id), self.retry_config, || {
            short_url::Entity::delete_by_id(id_owned.clone()).exec(db)
        })
        .await
        .map_err(|e| SnappyError::database_operation(format!("Failed to delete url: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Short url deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    pub async fn delete_url_by_code(&self, code: &str) -> Result<bool> {
        let result = short_url::Entity::delete_many()
            .filter(short_url::Column::ShortCode.eq(code))
            .exec(&self.db)
            .await
            .map_err(|e| SnappyError::database_operation(format!("Failed to delete url: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// 原子地 clicks = clicks + 1，返回更新后的记录；不存在时返回 None
    pub async fn increment_clicks(&self, id: &str) -> Result<Option<ShortUrl>> {
        let db = &self.db;

        // 非幂等：连接中断时不重试，避免一次访问计两次
        let result = retry::with_retry_if(
            &format!("increment_clicks({})", id),
            self.retry_config,
            retry::is_lock_contention_error,
            || {
                short_url::Entity::update_many()
                    .col_expr(
                        short_url::Column::Clicks,
                        Expr::col(short_url::Column::Clicks).add(1),
                    )
                    .filter(short_url::Column::Id.eq(id))
                    .exec(db)
            },
        )
        .await
        .map_err(|e| {
            SnappyError::database_operation(format!("Failed to increment clicks: {}", e))
        })?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_url_by_id(id).await
    }

    /// 插入用户；邮箱冲突返回 `UserAlreadyExists`
    pub async fn insert_user(&self, new_user: &User) -> Result<()> {
        user::Entity::insert(user_to_active_model(new_user))
            .exec(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    SnappyError::user_already_exists(format!(
                        "User with email '{}' already exists",
                        new_user.email
                    ))
                } else {
                    SnappyError::database_operation(format!("Failed to create user: {}", e))
                }
            })?;

        info!("User registered: {}", new_user.id);
        Ok(())
    }
}
