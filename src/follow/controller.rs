use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::client::Followable;
use crate::middleware::auth::current_user;
use crate::middleware::permission::{ContentRef, ensure_permitted};
use crate::state::AppState;
use crate::utils::error::CustomError;
use crate::utils::model::{CommentablePath, FollowedUserPath};

/// Subscribes the caller to every thread of a topic
/// POST /courses/{org}/{course}/{run}/discussion/{commentable_id}/follow
pub async fn follow_commentable(
    req: HttpRequest,
    path: web::Path<CommentablePath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(&state, &user, &course_key, &course, ContentRef::None, "follow_commentable")
        .await?;

    let commentable = state.comments.find_commentable(&path.commentable_id).await?;
    state
        .comments
        .follow(&user.id, &Followable::Commentable(commentable.id))
        .await?;
    Ok(HttpResponse::Ok().json(json!({})))
}

/// POST .../{commentable_id}/unfollow
pub async fn unfollow_commentable(
    req: HttpRequest,
    path: web::Path<CommentablePath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(&state, &user, &course_key, &course, ContentRef::None, "unfollow_commentable")
        .await?;

    let commentable = state.comments.find_commentable(&path.commentable_id).await?;
    state
        .comments
        .unfollow(&user.id, &Followable::Commentable(commentable.id))
        .await?;
    Ok(HttpResponse::Ok().json(json!({})))
}

/// Subscribes the caller to another user's posts
/// POST .../users/{followed_user_id}/follow
pub async fn follow_user(
    req: HttpRequest,
    path: web::Path<FollowedUserPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(&state, &user, &course_key, &course, ContentRef::None, "follow_user").await?;

    // No lookup: users the service has not met yet can still be followed.
    let followed = Followable::User(path.followed_user_id.clone());
    state.comments.follow(&user.id, &followed).await?;
    Ok(HttpResponse::Ok().json(json!({})))
}

/// POST .../users/{followed_user_id}/unfollow
pub async fn unfollow_user(
    req: HttpRequest,
    path: web::Path<FollowedUserPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(&state, &user, &course_key, &course, ContentRef::None, "unfollow_user")
        .await?;

    // No lookup: users the service has not met yet can still be followed.
    let followed = Followable::User(path.followed_user_id.clone());
    state.comments.unfollow(&user.id, &followed).await?;
    Ok(HttpResponse::Ok().json(json!({})))
}
