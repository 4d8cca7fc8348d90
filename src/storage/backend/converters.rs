use crate::storage::{ShortUrl, User};
use migration::entities::{short_url, user};

pub fn model_to_short_url(model: short_url::Model) -> ShortUrl {
    ShortUrl {
        id: model.id,
        user_id: model.user_id,
        original_url: model.original_url,
        short_code: model.short_code,
        title: model.title,
        clicks: model.clicks.max(0) as u64,
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 转换为 ActiveModel
///
/// 更新时不写 clicks 和 created_at，避免覆盖并发的点击计数。
pub fn short_url_to_active_model(url: &ShortUrl, is_new: bool) -> short_url::ActiveModel {
    use sea_orm::ActiveValue::*;

    short_url::ActiveModel {
        id: Set(url.id.clone()),
        user_id: if is_new {
            Set(url.user_id.clone())
        } else {
            NotSet
        },
        original_url: Set(url.original_url.clone()),
        short_code: Set(url.short_code.clone()),
        title: Set(url.title.clone()),
        clicks: if is_new {
            Set(url.clicks as i64)
        } else {
            NotSet
        },
        expires_at: Set(url.expires_at),
        created_at: if is_new { Set(url.created_at) } else { NotSet },
        updated_at: Set(url.updated_at),
    }
}

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}

pub fn user_to_active_model(user: &User) -> user::ActiveModel {
    use sea_orm::ActiveValue::Set;

    user::ActiveModel {
        id: Set(user.id.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        created_at: Set(user.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    fn create_test_model() -> short_url::Model {
        let now = Utc::now();
        short_url::Model {
            id: "u-1".to_string(),
            user_id: "owner".to_string(),
            original_url: "https://example.com".to_string(),
            short_code: "abc123".to_string(),
            title: Some("Example".to_string()),
            clicks: 42,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_model_to_short_url() {
        let url = model_to_short_url(create_test_model());

        assert_eq!(url.short_code, "abc123");
        assert_eq!(url.user_id, "owner");
        assert_eq!(url.title.as_deref(), Some("Example"));
        assert_eq!(url.clicks, 42);
    }

    #[test]
    fn test_negative_clicks_clamped() {
        let mut model = create_test_model();
        model.clicks = -3;
        assert_eq!(model_to_short_url(model).clicks, 0);
    }

    #[test]
    fn test_active_model_for_update_skips_counters() {
        let url = model_to_short_url(create_test_model());
        let active = short_url_to_active_model(&url, false);

        assert!(matches!(active.id, ActiveValue::Set(_)));
        assert!(matches!(active.short_code, ActiveValue::Set(_)));
        assert!(matches!(active.clicks, ActiveValue::NotSet));
        assert!(matches!(active.created_at, ActiveValue::NotSet));
        assert!(matches!(active.user_id, ActiveValue::NotSet));
    }

    #[test]
    fn test_active_model_for_insert_sets_everything() {
        let url = model_to_short_url(create_test_model());
        let active = short_url_to_active_model(&url, true);

        assert!(matches!(active.clicks, ActiveValue::Set(42)));
        assert!(matches!(active.created_at, ActiveValue::Set(_)));
        assert!(matches!(active.user_id, ActiveValue::Set(_)));
    }
}
