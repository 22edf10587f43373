use crate::comment::index::comment_routes;
use crate::follow::index::{commentable_follow_routes, user_follow_routes};
use crate::middleware::auth::verify_token;
use crate::thread::index::{commentable_thread_routes, thread_routes};
use crate::uploader::index::upload_routes;
use crate::user::index::user_routes;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

/// Every discussion action, relative to the course discussion prefix.
///
/// Routes starting with a fixed segment come first; the `{commentable_id}`
/// routes would otherwise shadow them.
pub fn discussion_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(upload_routes);
    cfg.configure(user_routes);
    cfg.configure(user_follow_routes);
    cfg.configure(thread_routes);
    cfg.configure(comment_routes);
    cfg.configure(commentable_thread_routes);
    cfg.configure(commentable_follow_routes);
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/courses/{org}/{course}/{run}/discussion")
            .wrap(HttpAuthentication::bearer(verify_token))
            .configure(discussion_routes),
    );
}
