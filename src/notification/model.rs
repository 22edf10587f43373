use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REPLY_TO_THREAD: &str = "open-edx.lms.discussions.reply-to-thread";
pub const POST_UPVOTED: &str = "open-edx.lms.discussions.post-upvoted";
pub const THREAD_FOLLOWED: &str = "open-edx.lms.discussions.thread-followed";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NotificationType {
    pub name: String,
}

impl NotificationType {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Fixed-shape payload of every discussion notification.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DiscussionPayload {
    #[serde(rename = "_schema_version")]
    pub schema_version: String,
    pub action_user_id: String,
    pub action_username: String,
    pub thread_title: String,
    pub link_to_thread: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationMessage {
    pub id: Uuid,
    /// Course the message belongs to.
    pub namespace: String,
    pub msg_type: NotificationType,
    pub payload: DiscussionPayload,
    pub created: DateTime<Utc>,
}

impl NotificationMessage {
    pub fn new(namespace: &str, msg_type: NotificationType, payload: DiscussionPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            namespace: namespace.to_string(),
            msg_type,
            payload,
            created: Utc::now(),
        }
    }
}
