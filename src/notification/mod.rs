pub mod model;
pub mod service;

pub use service::{HttpNotificationPublisher, NotificationPublisher, publish_discussion_notification};
