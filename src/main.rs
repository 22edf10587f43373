use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use serde_json::json;
use std::io;
use std::sync::Arc;

mod client;
mod comment;
mod course;
mod database;
mod follow;
mod middleware;
mod notification;
mod router;
mod state;
mod thread;
mod uploader;
mod user;
mod utils;

#[cfg(test)]
mod testing;

use client::HttpCommentClient;
use course::MongoCourseStore;
use middleware::error_handler::{form_config, query_config};
use middleware::not_found::not_found;
use notification::{HttpNotificationPublisher, NotificationPublisher};
use router::index::routes;
use state::AppState;
use uploader::storage::{CloudinaryStorage, FileStorage, LocalFileStorage, LocalStorageConfig};
use user::service::MongoUserDirectory;
use utils::config::{AppConfig, StorageKind};

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Course discussion service",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "course-discussions".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let mongo_db = database::connect_to_mongo(&database::MongoSettings::from_env())
        .await
        .map_err(io::Error::other)?;

    // Sessions are optional; without Redis the signed token alone authenticates.
    let redis_service = match database::connect_to_redis().await {
        Ok(client) => Some(web::Data::new(database::RedisService::new(&client))),
        Err(e) => {
            warn!("Session store disabled: {}", e);
            None
        }
    };

    let notifier: Option<Arc<dyn NotificationPublisher>> = if config.notifications_enabled {
        Some(Arc::new(
            HttpNotificationPublisher::new().map_err(io::Error::other)?,
        ))
    } else {
        None
    };

    let storage: Arc<dyn FileStorage> = match config.storage {
        StorageKind::Local => Arc::new(LocalFileStorage::new(LocalStorageConfig::from_env())),
        StorageKind::Cloudinary => Arc::new(CloudinaryStorage::new().map_err(io::Error::other)?),
    };

    let state = web::Data::new(AppState {
        comments: Arc::new(HttpCommentClient::new().map_err(io::Error::other)?),
        courses: Arc::new(MongoCourseStore::new(&mongo_db)),
        users: Arc::new(MongoUserDirectory::new(&mongo_db)),
        notifier,
        storage,
        settings: config.forum.clone(),
    });

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(form_config())
            .app_data(query_config());
        if let Some(redis_service) = &redis_service {
            app = app.app_data(redis_service.clone());
        }
        app.configure(routes)
            .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
