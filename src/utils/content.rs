use actix_web::{HttpRequest, HttpResponse};
use serde_json::{Map, Value, json};

use crate::client::{ForumUser, Thread, retrieve_user_or_new};
use crate::course::Course;
use crate::middleware::auth::Claims;
use crate::middleware::permission::ForumPermissions;
use crate::state::AppState;
use crate::utils::error::CustomError;
use crate::utils::helpers::is_ajax;

/// Content fields that may be sent back to the browser.
const CONTENT_FIELDS: &[&str] = &[
    "id",
    "title",
    "body",
    "course_id",
    "anonymous",
    "anonymous_to_peers",
    "endorsed",
    "parent_id",
    "thread_id",
    "votes",
    "closed",
    "created_at",
    "updated_at",
    "depth",
    "type",
    "commentable_id",
    "comments_count",
    "at_position_list",
    "children",
    "highlighted_title",
    "highlighted_body",
    "courseware_title",
    "courseware_url",
    "unread_comments_count",
    "read",
    "group_id",
    "group_name",
    "pinned",
    "abuse_flaggers",
    "stats",
    "resp_skip",
    "resp_limit",
    "resp_total",
    "thread_type",
    "endorsed_responses",
    "non_endorsed_responses",
    "non_endorsed_resp_total",
    "endorsement",
];

const AUTHOR_FIELDS: &[&str] = &["username", "user_id"];

const CHILD_FIELDS: &[&str] = &["children", "endorsed_responses", "non_endorsed_responses"];

/// Shapes a comment-service entity for the browser.
///
/// Author identity is only kept for non-anonymous content, and for content
/// anonymous to peers only when the viewer is staff. Null fields are dropped
/// and nested responses are prepared the same way.
pub fn prepare_content(content: &Value, course: &Course, is_staff: bool) -> Value {
    let Some(source) = content.as_object() else {
        return content.clone();
    };

    let anonymous = source.get("anonymous").and_then(Value::as_bool);
    let anonymous_to_peers = source.get("anonymous_to_peers").and_then(Value::as_bool);
    let reveal_author = anonymous == Some(false) && (anonymous_to_peers == Some(false) || is_staff);

    let mut prepared = Map::new();
    let fields = CONTENT_FIELDS
        .iter()
        .chain(AUTHOR_FIELDS.iter().filter(|_| reveal_author));
    for field in fields {
        if let Some(value) = source.get(*field) {
            if !value.is_null() {
                prepared.insert(field.to_string(), value.clone());
            }
        }
    }

    if !reveal_author {
        if let Some(Value::Object(endorsement)) = prepared.get_mut("endorsement") {
            endorsement.remove("user_id");
        }
    }

    for field in CHILD_FIELDS {
        if let Some(Value::Array(children)) = prepared.get(*field) {
            let children = children
                .iter()
                .map(|child| prepare_content(child, course, is_staff))
                .collect();
            prepared.insert(field.to_string(), Value::Array(children));
        }
    }

    if let Some(group_id) = prepared.get("group_id").and_then(Value::as_i64) {
        if let Some(cohort) = course.cohort_by_id(group_id) {
            prepared.insert("group_name".to_string(), Value::String(cohort.name.clone()));
        }
    }

    Value::Object(prepared)
}

/// Per-user metadata the discussion front end renders next to `content`.
pub fn annotated_content_info(content: &Value, user_info: &ForumUser, ability: Value) -> Value {
    let id = content.get("id").and_then(Value::as_str).unwrap_or_default();
    let contains = |ids: &[String]| ids.iter().any(|candidate| candidate == id);

    let voted = if contains(&user_info.upvoted_ids) {
        "up"
    } else if contains(&user_info.downvoted_ids) {
        "down"
    } else {
        ""
    };

    json!({
        "voted": voted,
        "subscribed": contains(&user_info.subscribed_thread_ids),
        "ability": ability,
    })
}

/// Adds the courseware location of inline discussions to thread content.
pub fn add_courseware_context(content: &mut Value, course: &Course) {
    let Some(map) = content.as_object_mut() else {
        return;
    };
    let commentable_id = map
        .get("commentable_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if let Some(inline) = course.inline_discussion(&commentable_id) {
        map.insert("courseware_url".to_string(), Value::String(inline.url.clone()));
        map.insert("courseware_title".to_string(), Value::String(inline.title.clone()));
    }
}

/// Stable URL of a thread page.
pub fn thread_permalink(thread: &Thread) -> String {
    format!(
        "/courses/{}/discussion/forum/{}/threads/{}",
        thread.course_id,
        thread.commentable_id,
        thread.id.as_deref().unwrap_or_default()
    )
}

/// Stable URL of a response, anchored inside its thread page.
pub fn comment_permalink(thread: &Thread, comment_id: &str) -> String {
    format!("{}#{}", thread_permalink(thread), comment_id)
}

/// Responds with `{content, annotated_content_info}` to XHR callers and with
/// the prepared content alone otherwise.
pub async fn content_response(
    req: &HttpRequest,
    state: &AppState,
    user: &Claims,
    permissions: &ForumPermissions,
    course: &Course,
    content: Value,
) -> Result<HttpResponse, CustomError> {
    if !is_ajax(req) {
        return Ok(HttpResponse::Ok().json(prepare_content(&content, course, false)));
    }

    let user_info =
        retrieve_user_or_new(state.comments.as_ref(), &user.id, Some(course.id.as_str())).await?;
    let info = annotated_content_info(&content, &user_info, permissions.ability(&content));

    Ok(HttpResponse::Ok().json(json!({
        "content": prepare_content(&content, course, false),
        "annotated_content_info": info,
    })))
}
