use async_trait::async_trait;
use std::env;

use super::model::{DiscussionPayload, NotificationMessage, NotificationType};
use crate::client::Thread;
use crate::middleware::auth::Claims;

/// Notification bus as seen by the discussion handlers.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn register_type(&self, msg_type: &NotificationType) -> Result<(), String>;

    async fn publish_to_user(&self, user_id: &str, message: &NotificationMessage)
    -> Result<(), String>;
}

/// Notification service endpoint loaded from environment variables
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl NotificationConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            base_url: env::var("NOTIFICATIONS_URL").map_err(|_| "NOTIFICATIONS_URL is required")?,
            api_key: env::var("NOTIFICATIONS_API_KEY").ok(),
        })
    }
}

pub struct HttpNotificationPublisher {
    config: NotificationConfig,
    client: reqwest::Client,
}

impl HttpNotificationPublisher {
    pub fn new() -> Result<Self, String> {
        let config = NotificationConfig::from_env()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: NotificationConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let request = self.client.post(url);
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl NotificationPublisher for HttpNotificationPublisher {
    async fn register_type(&self, msg_type: &NotificationType) -> Result<(), String> {
        let response = self
            .post("types")
            .json(msg_type)
            .send()
            .await
            .map_err(|e| format!("Failed to register notification type: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!(
                "Registering notification type {} failed with {}",
                msg_type.name,
                response.status()
            ))
        }
    }

    async fn publish_to_user(
        &self,
        user_id: &str,
        message: &NotificationMessage,
    ) -> Result<(), String> {
        let response = self
            .post(&format!("users/{}/messages", user_id))
            .json(message)
            .send()
            .await
            .map_err(|e| format!("Failed to publish notification: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!(
                "Publishing notification to {} failed with {}",
                user_id,
                response.status()
            ))
        }
    }
}

/// Tells the thread author that `actor` acted on their thread.
///
/// Nothing is sent when notifications are disabled or when the actor wrote
/// the thread. Failures are logged and never reach the caller.
pub async fn publish_discussion_notification(
    notifier: Option<&dyn NotificationPublisher>,
    msg_type_name: &str,
    course_id: &str,
    thread: &Thread,
    actor: &Claims,
    link_to_thread: String,
) {
    let Some(notifier) = notifier else {
        return;
    };
    if actor.id == thread.user_id {
        return;
    }

    let msg_type = NotificationType::named(msg_type_name);
    let message = NotificationMessage::new(
        course_id,
        msg_type.clone(),
        DiscussionPayload {
            schema_version: "1".to_string(),
            action_user_id: actor.id.clone(),
            action_username: actor.username.clone(),
            thread_title: thread.title.clone(),
            link_to_thread,
        },
    );

    let result = match notifier.register_type(&msg_type).await {
        Ok(()) => notifier.publish_to_user(&thread.user_id, &message).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        log::error!(
            "Dropping {} notification for user {}: {}",
            msg_type_name,
            thread.user_id,
            e
        );
    }
}
