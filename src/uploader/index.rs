use super::controller::upload;
use actix_web::web;

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload));
}
