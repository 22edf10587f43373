use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::utils::error::CustomError;

static KEY_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-~.:]+$").expect("valid course key pattern"));

/// `org/course/run` identifier of a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseKey {
    pub org: String,
    pub course: String,
    pub run: String,
}

impl CourseKey {
    pub fn from_parts(org: &str, course: &str, run: &str) -> Result<Self, CustomError> {
        for segment in [org, course, run] {
            if !KEY_SEGMENT.is_match(segment) {
                return Err(CustomError::NotFoundError(format!(
                    "Invalid course id segment '{}'",
                    segment
                )));
            }
        }
        Ok(Self {
            org: org.to_string(),
            course: course.to_string(),
            run: run.to_string(),
        })
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.org, self.course, self.run)
    }
}

impl FromStr for CourseKey {
    type Err = CustomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [org, course, run] => CourseKey::from_parts(org, course, run),
            _ => Err(CustomError::NotFoundError(format!("Invalid course id '{}'", s))),
        }
    }
}

/// Course-wide discussion topic (not attached to courseware).
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DiscussionTopic {
    pub id: String,
    pub name: String,
}

/// Discussion embedded in a courseware unit.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct InlineDiscussion {
    pub commentable_id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CohortConfig {
    #[serde(default)]
    pub cohorted: bool,
    /// Course-wide topics that are cohorted. Inline discussions always are.
    #[serde(default)]
    pub cohorted_discussions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Cohort {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub users: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_true")]
    pub allow_anonymous: bool,
    #[serde(default)]
    pub allow_anonymous_to_peers: bool,
    #[serde(default)]
    pub discussion_topics: Vec<DiscussionTopic>,
    #[serde(default)]
    pub inline_discussions: Vec<InlineDiscussion>,
    #[serde(default)]
    pub cohort_config: CohortConfig,
    #[serde(default)]
    pub cohorts: Vec<Cohort>,
    #[serde(default)]
    pub staff: Vec<String>,
}

impl Course {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            allow_anonymous: true,
            allow_anonymous_to_peers: false,
            discussion_topics: Vec::new(),
            inline_discussions: Vec::new(),
            cohort_config: CohortConfig::default(),
            cohorts: Vec::new(),
            staff: Vec::new(),
        }
    }

    pub fn is_staff(&self, user_id: &str) -> bool {
        self.staff.iter().any(|id| id == user_id)
    }

    /// Ids of every topic a thread may be filed under.
    pub fn discussion_category_ids(&self) -> Vec<&str> {
        self.discussion_topics
            .iter()
            .map(|topic| topic.id.as_str())
            .chain(
                self.inline_discussions
                    .iter()
                    .map(|inline| inline.commentable_id.as_str()),
            )
            .collect()
    }

    pub fn inline_discussion(&self, commentable_id: &str) -> Option<&InlineDiscussion> {
        self.inline_discussions
            .iter()
            .find(|inline| inline.commentable_id == commentable_id)
    }

    pub fn cohort_by_id(&self, group_id: i64) -> Option<&Cohort> {
        self.cohorts.iter().find(|cohort| cohort.id == group_id)
    }

    pub fn cohort_for_user(&self, user_id: &str) -> Option<&Cohort> {
        self.cohorts
            .iter()
            .find(|cohort| cohort.users.iter().any(|id| id == user_id))
    }
}

/// Forum role granting a set of permissions to its users within one course.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForumRole {
    pub course_id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
}
