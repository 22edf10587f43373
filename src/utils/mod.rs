pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod model;
pub mod uploads;
