pub mod short_url;
pub mod user;

pub use short_url::Entity as ShortUrlEntity;
pub use user::Entity as UserEntity;
