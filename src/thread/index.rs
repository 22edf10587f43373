use super::controller::{
    create_thread, delete_thread, flag_abuse_for_thread, follow_thread, openclose_thread,
    pin_thread, un_flag_abuse_for_thread, un_pin_thread, undo_vote_for_thread, unfollow_thread,
    update_thread, vote_for_thread,
};
use actix_web::web;

pub fn thread_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/threads/{thread_id}/update", web::post().to(update_thread))
        .route("/threads/{thread_id}/delete", web::post().to(delete_thread))
        .route("/threads/{thread_id}/close", web::post().to(openclose_thread))
        .route(
            "/threads/{content_id}/{value:upvote|downvote}",
            web::post().to(vote_for_thread),
        )
        .route("/threads/{thread_id}/unvote", web::post().to(undo_vote_for_thread))
        .route("/threads/{thread_id}/flagAbuse", web::post().to(flag_abuse_for_thread))
        .route("/threads/{thread_id}/unFlagAbuse", web::post().to(un_flag_abuse_for_thread))
        .route("/threads/{thread_id}/pin", web::post().to(pin_thread))
        .route("/threads/{thread_id}/unpin", web::post().to(un_pin_thread))
        .route("/threads/{thread_id}/follow", web::post().to(follow_thread))
        .route("/threads/{thread_id}/unfollow", web::post().to(unfollow_thread));
}

/// Registered after every fixed prefix since `{commentable_id}` matches any segment.
pub fn commentable_thread_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/{commentable_id}/threads/create",
        web::post().to(create_thread),
    );
}
