pub mod cohort;
pub mod model;
pub mod service;

pub use model::{Course, CourseKey};
pub use service::{CourseStore, MongoCourseStore};
