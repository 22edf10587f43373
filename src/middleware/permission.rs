//! Forum permission gate.
//!
//! Each discussion view maps to a rule: a list of alternatives, any of which
//! grants access. An alternative is a conjunction of forum permissions and
//! conditions on the content being acted on.

use serde_json::{Value, json};
use std::collections::HashSet;

use crate::course::{Course, CourseKey};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::utils::error::CustomError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Requirement {
    Permission(&'static str),
    /// Content exists and is not closed.
    IsOpen,
    /// Content exists and was written by the acting user.
    IsAuthor,
}

use Requirement::{IsAuthor, IsOpen, Permission};

type Rule = &'static [&'static [Requirement]];

fn view_rule(view: &str) -> Option<Rule> {
    let rule: Rule = match view {
        "create_thread" => &[&[Permission("create_thread")]],
        "update_thread" => &[
            &[Permission("edit_content")],
            &[Permission("update_thread"), IsOpen, IsAuthor],
        ],
        "create_comment" => &[&[Permission("create_comment"), IsOpen]],
        "delete_thread" => &[
            &[Permission("delete_thread")],
            &[Permission("update_thread"), IsAuthor],
        ],
        "update_comment" => &[
            &[Permission("edit_content")],
            &[Permission("update_comment"), IsOpen, IsAuthor],
        ],
        "endorse_comment" => &[&[Permission("endorse_comment")]],
        "openclose_thread" => &[&[Permission("openclose_thread")]],
        "create_sub_comment" => &[&[Permission("create_sub_comment"), IsOpen]],
        "delete_comment" => &[
            &[Permission("delete_comment")],
            &[Permission("update_comment"), IsOpen, IsAuthor],
        ],
        "vote_for_comment" | "vote_for_thread" => &[&[Permission("vote"), IsOpen]],
        "undo_vote_for_comment" | "undo_vote_for_thread" => &[&[Permission("unvote"), IsOpen]],
        "flag_abuse_for_thread"
        | "un_flag_abuse_for_thread"
        | "flag_abuse_for_comment"
        | "un_flag_abuse_for_comment" => &[&[Permission("vote")]],
        "pin_thread" | "un_pin_thread" => &[&[Permission("openclose_thread")]],
        "follow_thread" => &[&[Permission("follow_thread")]],
        "follow_commentable" => &[&[Permission("follow_commentable")]],
        "follow_user" => &[&[Permission("follow_user")]],
        "unfollow_thread" => &[&[Permission("unfollow_thread")]],
        "unfollow_commentable" => &[&[Permission("unfollow_commentable")]],
        "unfollow_user" => &[&[Permission("unfollow_user")]],
        _ => return None,
    };
    Some(rule)
}

/// What the target of a request refers to, taken from the route.
#[derive(Debug, Clone, Copy)]
pub enum ContentRef<'a> {
    Thread(&'a str),
    Comment(&'a str),
    /// Course or commentable level action.
    None,
}

/// Forum permissions of one user within one course.
#[derive(Debug, Clone)]
pub struct ForumPermissions {
    pub user_id: String,
    pub permissions: HashSet<String>,
    pub is_staff: bool,
}

impl ForumPermissions {
    pub fn new(user_id: impl Into<String>, permissions: HashSet<String>, is_staff: bool) -> Self {
        Self {
            user_id: user_id.into(),
            permissions,
            is_staff,
        }
    }

    /// Course staff hold every forum permission.
    pub fn has(&self, permission: &str) -> bool {
        self.is_staff || self.permissions.contains(permission)
    }

    fn satisfies(&self, requirement: &Requirement, content: Option<&Value>) -> bool {
        match requirement {
            Permission(name) => self.has(name),
            IsOpen => content.is_some_and(|c| !c.get("closed").and_then(Value::as_bool).unwrap_or(false)),
            IsAuthor => content.is_some_and(|c| {
                c.get("user_id").and_then(Value::as_str) == Some(self.user_id.as_str())
            }),
        }
    }

    pub fn check_view(&self, view: &str, content: Option<&Value>) -> bool {
        match view_rule(view) {
            Some(rule) => rule
                .iter()
                .any(|alternative| alternative.iter().all(|req| self.satisfies(req, content))),
            None => false,
        }
    }

    /// Actions the user may take on `content`, as rendered to clients.
    pub fn ability(&self, content: &Value) -> Value {
        let is_thread = content.get("type").and_then(Value::as_str) == Some("thread");
        let pick = |thread_view: &str, comment_view: &str| {
            let view = if is_thread { thread_view } else { comment_view };
            self.check_view(view, Some(content))
        };
        json!({
            "editable": pick("update_thread", "update_comment"),
            "can_reply": pick("create_comment", "create_sub_comment"),
            "can_delete": pick("delete_thread", "delete_comment"),
            "can_openclose": is_thread && self.check_view("openclose_thread", Some(content)),
            "can_vote": pick("vote_for_thread", "vote_for_comment"),
        })
    }
}

/// Resolves the referenced content and rejects the request with 401 unless
/// `user` may perform `view` on it.
pub async fn ensure_permitted(
    state: &AppState,
    user: &Claims,
    course_key: &CourseKey,
    course: &Course,
    target: ContentRef<'_>,
    view: &str,
) -> Result<ForumPermissions, CustomError> {
    let content = match target {
        ContentRef::Thread(id) => Some(state.comments.find_thread(id).await?.to_content()),
        ContentRef::Comment(id) => Some(state.comments.find_comment(id).await?.to_content()),
        ContentRef::None => None,
    };

    let permissions = state.permissions(course_key, course, &user.id).await?;
    if permissions.check_view(view, content.as_ref()) {
        Ok(permissions)
    } else {
        log::warn!(
            "Denied {} for user {} in {}",
            view,
            user.id,
            course_key
        );
        Err(CustomError::unauthorized())
    }
}
