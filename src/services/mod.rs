//! Service layer for business logic
//!
//! Shared between the HTTP handlers and the CLI.

mod auth_service;
mod url_service;

pub use auth_service::{AuthService, normalize_email};
pub use url_service::{CreateUrlRequest, UpdateUrlRequest, UrlService};
