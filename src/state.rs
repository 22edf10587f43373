use std::sync::Arc;

use crate::client::CommentClient;
use crate::course::{Course, CourseKey, CourseStore};
use crate::middleware::permission::ForumPermissions;
use crate::notification::service::NotificationPublisher;
use crate::uploader::storage::FileStorage;
use crate::user::service::UserDirectory;
use crate::utils::config::ForumSettings;
use crate::utils::error::CustomError;

/// Collaborators shared by every discussion handler.
pub struct AppState {
    pub comments: Arc<dyn CommentClient>,
    pub courses: Arc<dyn CourseStore>,
    pub users: Arc<dyn UserDirectory>,
    /// `None` when notifications are disabled.
    pub notifier: Option<Arc<dyn NotificationPublisher>>,
    pub storage: Arc<dyn FileStorage>,
    pub settings: ForumSettings,
}

impl AppState {
    pub async fn load_course(&self, course_key: &CourseKey) -> Result<Course, CustomError> {
        self.courses
            .get_course(course_key)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Course not found".to_string()))
    }

    pub async fn permissions(
        &self,
        course_key: &CourseKey,
        course: &Course,
        user_id: &str,
    ) -> Result<ForumPermissions, CustomError> {
        let permissions = self.courses.user_permissions(course_key, user_id).await?;
        Ok(ForumPermissions::new(
            user_id,
            permissions,
            course.is_staff(user_id),
        ))
    }
}
