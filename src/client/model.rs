use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_thread_type() -> String {
    "discussion".to_string()
}

/// A discussion thread as stored by the comment service.
///
/// Fields this layer never touches (votes, counts, children...) are kept in
/// `extra` so they survive a round trip into the response.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Thread {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub course_id: String,
    pub commentable_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub anonymous_to_peers: bool,
    #[serde(default = "default_thread_type")]
    pub thread_type: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Thread {
    pub fn to_content(&self) -> Value {
        with_type(serde_json::to_value(self).unwrap_or(Value::Null), "thread")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Endorsement {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub thread_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub body: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub course_id: String,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub anonymous_to_peers: bool,
    #[serde(default)]
    pub endorsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endorsement: Option<Endorsement>,
    /// Write-only: the user toggling endorsement on the next save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endorsement_user_id: Option<String>,
    #[serde(default)]
    pub depth: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    pub fn to_content(&self) -> Value {
        with_type(serde_json::to_value(self).unwrap_or(Value::Null), "comment")
    }
}

fn with_type(mut content: Value, kind: &str) -> Value {
    if let Some(map) = content.as_object_mut() {
        map.entry("type").or_insert_with(|| Value::String(kind.to_string()));
    }
    content
}

/// The forum-side view of a user, including follow and vote relationships.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ForumUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub threads_count: u64,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub upvoted_ids: Vec<String>,
    #[serde(default)]
    pub downvoted_ids: Vec<String>,
    #[serde(default)]
    pub subscribed_thread_ids: Vec<String>,
    #[serde(default)]
    pub subscribed_commentable_ids: Vec<String>,
    #[serde(default)]
    pub subscribed_user_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Commentable {
    pub id: String,
}

/// Content that can receive votes and abuse flags.
#[derive(Debug, Clone, PartialEq)]
pub enum Votable {
    Thread(String),
    Comment(String),
}

impl Votable {
    pub fn path(&self) -> String {
        match self {
            Votable::Thread(id) => format!("threads/{}", id),
            Votable::Comment(id) => format!("comments/{}", id),
        }
    }
}

/// Anything a user can subscribe to.
#[derive(Debug, Clone, PartialEq)]
pub enum Followable {
    Thread(String),
    Commentable(String),
    User(String),
}

impl Followable {
    /// `(source_type, source_id)` as the subscription API names them.
    pub fn source(&self) -> (&'static str, &str) {
        match self {
            Followable::Thread(id) => ("thread", id),
            Followable::Commentable(id) => ("other", id),
            Followable::User(id) => ("user", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteValue::Up => "up",
            VoteValue::Down => "down",
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" | "upvote" => Ok(VoteValue::Up),
            "down" | "downvote" => Ok(VoteValue::Down),
            other => Err(format!("Unknown vote value '{}'", other)),
        }
    }
}
