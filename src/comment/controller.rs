use actix_web::{HttpRequest, HttpResponse, web};

use crate::client::{Comment, Followable, Votable, VoteValue};
use crate::comment::model::{CommentForm, EndorseForm};
use crate::course::Course;
use crate::middleware::auth::{Claims, current_user};
use crate::middleware::permission::{ContentRef, ForumPermissions, ensure_permitted};
use crate::notification::model::REPLY_TO_THREAD;
use crate::notification::publish_discussion_notification;
use crate::state::AppState;
use crate::utils::content::{comment_permalink, content_response, prepare_content};
use crate::utils::error::CustomError;
use crate::utils::helpers::{form_flag, is_blank};
use crate::utils::model::{CommentPath, ThreadPath, VotePath};

fn too_deep() -> CustomError {
    CustomError::ValidationError("Comment level too deep".to_string())
}

fn require_body(form: &CommentForm) -> Result<String, CustomError> {
    if is_blank(form.body.as_deref()) {
        return Err(CustomError::ValidationError("Body can't be empty".to_string()));
    }
    Ok(form.body.clone().unwrap_or_default())
}

/// What a new comment answers.
enum ReplyTarget {
    /// A top-level response to the thread with this id.
    Thread(String),
    /// A reply nested under an existing comment.
    Comment(Comment),
}

async fn save_new_comment(
    req: &HttpRequest,
    state: &AppState,
    user: &Claims,
    permissions: &ForumPermissions,
    course: &Course,
    form: &CommentForm,
    target: ReplyTarget,
) -> Result<HttpResponse, CustomError> {
    let body = require_body(form)?;

    let (thread_id, parent_id) = match &target {
        ReplyTarget::Thread(thread_id) => (thread_id.clone(), None),
        ReplyTarget::Comment(parent) => (parent.thread_id.clone(), parent.id.clone()),
    };

    let comment = Comment {
        thread_id,
        parent_id,
        body,
        user_id: user.id.clone(),
        username: Some(user.username.clone()),
        course_id: course.id.clone(),
        anonymous: course.allow_anonymous && form_flag(form.anonymous.as_deref()),
        anonymous_to_peers: course.allow_anonymous_to_peers
            && form_flag(form.anonymous_to_peers.as_deref()),
        ..Default::default()
    };
    let comment = state.comments.save_comment(&comment).await?;

    if form_flag(form.auto_subscribe.as_deref()) {
        state
            .comments
            .follow(&user.id, &Followable::Thread(comment.thread_id.clone()))
            .await?;
    }

    if let (ReplyTarget::Thread(thread_id), Some(notifier)) = (&target, state.notifier.as_deref()) {
        match state.comments.find_thread(thread_id).await {
            Ok(thread) => {
                let link = comment_permalink(&thread, comment.id.as_deref().unwrap_or_default());
                publish_discussion_notification(
                    Some(notifier),
                    REPLY_TO_THREAD,
                    &course.id,
                    &thread,
                    user,
                    link,
                )
                .await;
            }
            Err(e) => log::error!("Skipping reply notification for thread {}: {}", thread_id, e),
        }
    }

    content_response(req, state, user, permissions, course, comment.to_content()).await
}

/// Adds a top-level response to a thread
/// POST /courses/{org}/{course}/{run}/discussion/threads/{thread_id}/reply
pub async fn create_comment(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    form: Option<web::Form<CommentForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    // A missing or non-form body is treated as an empty form.
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions = ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "create_comment",
    )
    .await?;

    // A negative limit disables responses altogether.
    if matches!(state.settings.max_comment_depth, Some(max) if max < 0) {
        return Err(too_deep());
    }

    log::debug!("Replying to thread {} in {}", path.thread_id, course_key);
    save_new_comment(
        &req,
        &state,
        &user,
        &permissions,
        &course,
        &form,
        ReplyTarget::Thread(path.thread_id.clone()),
    )
    .await
}

/// Replies to a response
/// POST .../comments/{comment_id}/reply
pub async fn create_sub_comment(
    req: HttpRequest,
    path: web::Path<CommentPath>,
    form: Option<web::Form<CommentForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions = ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.comment_id),
        "create_sub_comment",
    )
    .await?;

    let parent = state.comments.find_comment(&path.comment_id).await?;
    if matches!(state.settings.max_comment_depth, Some(max) if max <= parent.depth) {
        return Err(too_deep());
    }

    save_new_comment(
        &req,
        &state,
        &user,
        &permissions,
        &course,
        &form,
        ReplyTarget::Comment(parent),
    )
    .await
}

/// POST .../comments/{comment_id}/update
pub async fn update_comment(
    req: HttpRequest,
    path: web::Path<CommentPath>,
    form: Option<web::Form<CommentForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions = ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.comment_id),
        "update_comment",
    )
    .await?;

    let mut comment = state.comments.find_comment(&path.comment_id).await?;
    comment.body = require_body(&form)?;
    let comment = state.comments.save_comment(&comment).await?;

    content_response(&req, &state, &user, &permissions, &course, comment.to_content()).await
}

/// POST .../comments/{comment_id}/delete
pub async fn delete_comment(
    req: HttpRequest,
    path: web::Path<CommentPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.comment_id),
        "delete_comment",
    )
    .await?;

    let comment = state.comments.delete_comment(&path.comment_id).await?;
    Ok(HttpResponse::Ok().json(prepare_content(&comment.to_content(), &course, false)))
}

/// Marks or unmarks a response as the accepted answer
/// POST .../comments/{comment_id}/endorse
pub async fn endorse_comment(
    req: HttpRequest,
    path: web::Path<CommentPath>,
    form: Option<web::Form<EndorseForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.comment_id),
        "endorse_comment",
    )
    .await?;

    let mut comment = state.comments.find_comment(&path.comment_id).await?;
    comment.endorsed = form.is_some_and(|form| form_flag(form.endorsed.as_deref()));
    comment.endorsement_user_id = Some(user.id.clone());
    let comment = state.comments.save_comment(&comment).await?;

    Ok(HttpResponse::Ok().json(prepare_content(&comment.to_content(), &course, false)))
}

/// POST .../comments/{content_id}/{upvote|downvote}
pub async fn vote_for_comment(
    req: HttpRequest,
    path: web::Path<VotePath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let value: VoteValue = path.value.parse().map_err(CustomError::BadRequestError)?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.content_id),
        "vote_for_comment",
    )
    .await?;

    let updated = state
        .comments
        .vote(&user.id, &Votable::Comment(path.content_id.clone()), value)
        .await?;
    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}

/// POST .../comments/{comment_id}/unvote
pub async fn undo_vote_for_comment(
    req: HttpRequest,
    path: web::Path<CommentPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.comment_id),
        "undo_vote_for_comment",
    )
    .await?;

    let updated = state
        .comments
        .unvote(&user.id, &Votable::Comment(path.comment_id.clone()))
        .await?;
    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}

/// POST .../comments/{comment_id}/flagAbuse
pub async fn flag_abuse_for_comment(
    req: HttpRequest,
    path: web::Path<CommentPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.comment_id),
        "flag_abuse_for_comment",
    )
    .await?;

    let updated = state
        .comments
        .flag_abuse(&user.id, &Votable::Comment(path.comment_id.clone()))
        .await?;
    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}

/// POST .../comments/{comment_id}/unFlagAbuse
pub async fn un_flag_abuse_for_comment(
    req: HttpRequest,
    path: web::Path<CommentPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions = ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Comment(&path.comment_id),
        "un_flag_abuse_for_comment",
    )
    .await?;

    let remove_all = permissions.has("openclose_thread");
    let updated = state
        .comments
        .unflag_abuse(&user.id, &Votable::Comment(path.comment_id.clone()), remove_all)
        .await?;
    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}
