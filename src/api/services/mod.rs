pub mod auth;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod pages;
pub mod redirect;
pub mod types;
pub mod urls;

pub use auth::{auth_routes, login_rate_limiter};
pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use pages::page_routes;
pub use redirect::{RedirectService, redirect_routes};
pub use types::ApiResponse;
pub use urls::url_routes;
