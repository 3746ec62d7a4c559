//! API endpoint implementations.

mod chat;
mod notifications;
mod posts;
mod site;
mod topics;
mod uploads;
mod users;

pub use chat::{ChatApi, ChatMessageOptions};
pub use notifications::NotificationsApi;
pub use posts::PostsApi;
pub use site::SiteApi;
pub use topics::{LatestQuery, TopicsApi};
pub use uploads::{UploadOptions, UploadsApi};
pub use users::UsersApi;
