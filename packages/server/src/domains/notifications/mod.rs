pub mod dispatcher;
pub mod events;
pub mod models;
pub mod resolver;

pub use dispatcher::notify;
pub use events::{NotificationEvent, NotificationKind};
pub use models::notification::{NewNotification, Notification};
pub use resolver::{resolve, Audience, NotificationCase};
