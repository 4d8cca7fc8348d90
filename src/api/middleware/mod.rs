pub mod auth;
pub mod request_id;

pub use auth::{AuthenticatedUser, UserAuth, resolve_user};
pub use request_id::{RequestId, RequestIdMiddleware};
