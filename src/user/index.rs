use super::controller::users;
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::get().to(users));
}
