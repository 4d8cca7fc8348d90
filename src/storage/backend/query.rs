//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::{model_to_short_url, model_to_user};
use super::retry;
use crate::errors::{Result, SnappyError};
use crate::storage::{GlobalStats, ShortUrl, User, UserLinkStats};

use migration::entities::{short_url, user};

/// COUNT + SUM 聚合结果
#[derive(Debug, FromQueryResult)]
struct LinkAggregate {
    total_links: i64,
    total_clicks: Option<i64>,
}

fn query_err(what: &str, e: sea_orm::DbErr) -> SnappyError {
    SnappyError::database_operation(format!("{} failed: {}", what, e))
}

impl SeaOrmStorage {
    pub async fn get_url_by_id(&self, id: &str) -> Result<Option<ShortUrl>> {
        let db = &self.db;
        let id_owned = id.to_string();

        let model = retry::with_retry(&format!("get_url({})", id), self.retry_config, || {
            short_url::Entity::find_by_id(id_owned.clone()).one(db)
        })
        .await
        .map_err(|e| query_err("get_url_by_id", e))?;

        Ok(model.map(model_to_short_url))
    }

    /// 按短码精确查找（区分大小写）
    pub async fn get_url_by_code(&self, code: &str) -> Result<Option<ShortUrl>> {
        let db = &self.db;

        let model = retry::with_retry(&format!("get_by_code({})", code), self.retry_config, || {
            short_url::Entity::find()
                .filter(short_url::Column::ShortCode.eq(code))
                .one(db)
        })
        .await
        .map_err(|e| query_err("get_url_by_code", e))?;

        Ok(model.map(model_to_short_url))
    }

    /// 短码是否已被占用；`excluding_id` 用于更新时排除自身
    pub async fn code_exists(&self, code: &str, excluding_id: Option<&str>) -> Result<bool> {
        let mut query = short_url::Entity::find().filter(short_url::Column::ShortCode.eq(code));
        if let Some(id) = excluding_id {
            query = query.filter(short_url::Column::Id.ne(id));
        }

        let count = query
            .count(&self.db)
            .await
            .map_err(|e| query_err("code_exists", e))?;
        Ok(count > 0)
    }

    /// 某用户的全部链接，最新创建的在前
    pub async fn list_urls_by_user(&self, user_id: &str) -> Result<Vec<ShortUrl>> {
        let db = &self.db;

        let models = retry::with_retry(
            &format!("list_urls_by_user({})", user_id),
            self.retry_config,
            || {
                short_url::Entity::find()
                    .filter(short_url::Column::UserId.eq(user_id))
                    .order_by_desc(short_url::Column::CreatedAt)
                    .order_by_desc(short_url::Column::Id)
                    .all(db)
            },
        )
        .await
        .map_err(|e| query_err("list_urls_by_user", e))?;

        debug!("Loaded {} urls for user {}", models.len(), user_id);
        Ok(models.into_iter().map(model_to_short_url).collect())
    }

    /// 全部链接（CLI 使用），最新在前
    pub async fn list_all_urls(&self) -> Result<Vec<ShortUrl>> {
        let models = short_url::Entity::find()
            .order_by_desc(short_url::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| query_err("list_all_urls", e))?;

        Ok(models.into_iter().map(model_to_short_url).collect())
    }

    pub async fn user_link_stats(&self, user_id: &str) -> Result<UserLinkStats> {
        let agg = short_url::Entity::find()
            .select_only()
            .column_as(short_url::Column::Id.count(), "total_links")
            .column_as(short_url::Column::Clicks.sum(), "total_clicks")
            .filter(short_url::Column::UserId.eq(user_id))
            .into_model::<LinkAggregate>()
            .one(&self.db)
            .await
            .map_err(|e| query_err("user_link_stats", e))?;

        Ok(agg
            .map(|a| UserLinkStats {
                links: a.total_links.max(0) as u64,
                clicks: a.total_clicks.unwrap_or(0).max(0) as u64,
            })
            .unwrap_or_default())
    }

    pub async fn global_stats(&self) -> Result<GlobalStats> {
        let agg = short_url::Entity::find()
            .select_only()
            .column_as(short_url::Column::Id.count(), "total_links")
            .column_as(short_url::Column::Clicks.sum(), "total_clicks")
            .into_model::<LinkAggregate>()
            .one(&self.db)
            .await
            .map_err(|e| query_err("global_stats", e))?;

        let users = self.count_users().await?;
        let (links, clicks) = agg
            .map(|a| {
                (
                    a.total_links.max(0) as u64,
                    a.total_clicks.unwrap_or(0).max(0) as u64,
                )
            })
            .unwrap_or((0, 0));

        Ok(GlobalStats {
            users,
            links,
            clicks,
        })
    }

    /// 邮箱须已规范化（小写、去空白）
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = &self.db;

        let model = retry::with_retry("find_user_by_email", self.retry_config, || {
            user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(db)
        })
        .await
        .map_err(|e| query_err("find_user_by_email", e))?;

        Ok(model.map(model_to_user))
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let model = user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| query_err("get_user_by_id", e))?;

        Ok(model.map(model_to_user))
    }

    pub async fn count_users(&self) -> Result<u64> {
        user::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| query_err("count_users", e))
    }
}
