use serde::Deserialize;

use crate::course::CourseKey;
use crate::utils::error::CustomError;

/// `/courses/{org}/{course}/{run}/discussion`
#[derive(Debug, Deserialize)]
pub struct CoursePath {
    pub org: String,
    pub course: String,
    pub run: String,
}

impl CoursePath {
    pub fn course_key(&self) -> Result<CourseKey, CustomError> {
        CourseKey::from_parts(&self.org, &self.course, &self.run)
    }
}

#[derive(Debug, Deserialize)]
pub struct ThreadPath {
    pub org: String,
    pub course: String,
    pub run: String,
    pub thread_id: String,
}

impl ThreadPath {
    pub fn course_key(&self) -> Result<CourseKey, CustomError> {
        CourseKey::from_parts(&self.org, &self.course, &self.run)
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentPath {
    pub org: String,
    pub course: String,
    pub run: String,
    pub comment_id: String,
}

impl CommentPath {
    pub fn course_key(&self) -> Result<CourseKey, CustomError> {
        CourseKey::from_parts(&self.org, &self.course, &self.run)
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentablePath {
    pub org: String,
    pub course: String,
    pub run: String,
    pub commentable_id: String,
}

impl CommentablePath {
    pub fn course_key(&self) -> Result<CourseKey, CustomError> {
        CourseKey::from_parts(&self.org, &self.course, &self.run)
    }
}

#[derive(Debug, Deserialize)]
pub struct FollowedUserPath {
    pub org: String,
    pub course: String,
    pub run: String,
    pub followed_user_id: String,
}

impl FollowedUserPath {
    pub fn course_key(&self) -> Result<CourseKey, CustomError> {
        CourseKey::from_parts(&self.org, &self.course, &self.run)
    }
}

/// Vote routes carry `upvote` or `downvote` as the last segment.
#[derive(Debug, Deserialize)]
pub struct VotePath {
    pub org: String,
    pub course: String,
    pub run: String,
    pub content_id: String,
    pub value: String,
}

impl VotePath {
    pub fn course_key(&self) -> Result<CourseKey, CustomError> {
        CourseKey::from_parts(&self.org, &self.course, &self.run)
    }
}
