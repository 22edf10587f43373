use super::controller::{
    create_comment, create_sub_comment, delete_comment, endorse_comment, flag_abuse_for_comment,
    un_flag_abuse_for_comment, undo_vote_for_comment, update_comment, vote_for_comment,
};
use actix_web::web;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/threads/{thread_id}/reply", web::post().to(create_comment))
        .route("/comments/{comment_id}/reply", web::post().to(create_sub_comment))
        .route("/comments/{comment_id}/update", web::post().to(update_comment))
        .route("/comments/{comment_id}/delete", web::post().to(delete_comment))
        .route("/comments/{comment_id}/endorse", web::post().to(endorse_comment))
        .route(
            "/comments/{content_id}/{value:upvote|downvote}",
            web::post().to(vote_for_comment),
        )
        .route("/comments/{comment_id}/unvote", web::post().to(undo_vote_for_comment))
        .route("/comments/{comment_id}/flagAbuse", web::post().to(flag_abuse_for_comment))
        .route(
            "/comments/{comment_id}/unFlagAbuse",
            web::post().to(un_flag_abuse_for_comment),
        );
}
