pub mod db;
pub mod redis;

pub use db::{MongoSettings, connect_to_mongo};
pub use self::redis::{RedisService, connect_to_redis};
