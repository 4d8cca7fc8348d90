use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::storage::SeaOrmStorage;

use super::error_code::ErrorCode;
use super::helpers::json_response;

/// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct HealthView {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub database: DatabaseHealth,
    pub response_time_ms: u64,
}

#[derive(Serialize, Debug)]
pub struct DatabaseHealth {
    pub status: &'static str,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health Service
///
/// 直接 ping 存储层，不经过业务服务。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        storage: web::Data<Arc<SeaOrmStorage>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> HttpResponse {
        let started = Instant::now();
        trace!("Received health check request");

        let error = match tokio::time::timeout(Duration::from_secs(5), storage.ping()).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => {
                error!("Database health check failed: {}", e);
                Some(e.to_string())
            }
            Err(_) => {
                error!("Database health check timed out");
                Some("timeout".to_string())
            }
        };
        let healthy = error.is_none();

        let uptime_secs = (chrono::Utc::now() - app_start_time.start_datetime)
            .num_seconds()
            .max(0) as u64;

        let view = HealthView {
            status: if healthy { "healthy" } else { "unhealthy" },
            uptime_secs,
            database: DatabaseHealth {
                status: if healthy { "healthy" } else { "unhealthy" },
                backend: storage.backend_name().to_string(),
                error,
            },
            response_time_ms: started.elapsed().as_millis() as u64,
        };

        if healthy {
            json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(view))
        } else {
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ServiceUnavailable,
                "Service unavailable",
                Some(view),
            )
        }
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
}
