use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use std::collections::HashSet;

use crate::course::model::{Course, CourseKey, ForumRole};
use crate::utils::error::CustomError;

/// LMS-side course configuration and forum role lookups.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn get_course(&self, course_key: &CourseKey) -> Result<Option<Course>, CustomError>;

    /// Union of the forum permissions granted to `user_id` by its roles in the course.
    async fn user_permissions(
        &self,
        course_key: &CourseKey,
        user_id: &str,
    ) -> Result<HashSet<String>, CustomError>;
}

pub struct MongoCourseStore {
    courses: Collection<Course>,
    roles: Collection<ForumRole>,
}

impl MongoCourseStore {
    pub fn new(db: &Database) -> Self {
        MongoCourseStore {
            courses: db.collection::<Course>("courses"),
            roles: db.collection::<ForumRole>("forum_roles"),
        }
    }
}

#[async_trait]
impl CourseStore for MongoCourseStore {
    async fn get_course(&self, course_key: &CourseKey) -> Result<Option<Course>, CustomError> {
        self.courses
            .find_one(doc! { "_id": course_key.to_string() })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to fetch course: {}", e)))
    }

    async fn user_permissions(
        &self,
        course_key: &CourseKey,
        user_id: &str,
    ) -> Result<HashSet<String>, CustomError> {
        let cursor = self
            .roles
            .find(doc! { "course_id": course_key.to_string(), "users": user_id })
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Failed to fetch forum roles: {}", e))
            })?;

        let roles: Vec<ForumRole> = cursor.try_collect().await.map_err(|e| {
            CustomError::InternalServerError(format!("Failed to collect forum roles: {}", e))
        })?;

        Ok(roles
            .into_iter()
            .flat_map(|role| role.permissions.into_iter())
            .collect())
    }
}
