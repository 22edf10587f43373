use super::controller::{follow_commentable, follow_user, unfollow_commentable, unfollow_user};
use actix_web::web;

pub fn user_follow_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/users/{followed_user_id}/follow", web::post().to(follow_user))
        .route("/users/{followed_user_id}/unfollow", web::post().to(unfollow_user));
}

/// Registered last, `{commentable_id}` matches any segment.
pub fn commentable_follow_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{commentable_id}/follow", web::post().to(follow_commentable))
        .route("/{commentable_id}/unfollow", web::post().to(unfollow_commentable));
}
