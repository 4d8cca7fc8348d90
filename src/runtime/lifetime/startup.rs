use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::services::{AuthService, UrlService};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub url_service: Arc<UrlService>,
    pub auth_service: Arc<AuthService>,
}

/// 准备服务器启动的上下文
/// 包括存储连接、数据库迁移和业务服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // 签名密钥在第一个请求之前就绪，空密钥的警告也只打印一次
    let jwt = crate::api::jwt::get_jwt_service();
    debug!(
        "JWT service ready, access tokens valid for {} minutes",
        jwt.access_token_minutes()
    );

    let storage = StorageFactory::create()
        .await
        .context("Failed to initialize storage")?;
    info!("Using storage backend: {}", storage.backend_name());

    let url_service = Arc::new(UrlService::new(storage.clone()));
    let auth_service = Arc::new(AuthService::new(storage.clone()));

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        url_service,
        auth_service,
    })
}
