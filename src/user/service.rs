use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::user::model::LocalUser;
use crate::utils::error::CustomError;

/// Read access to LMS accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Exact, case-sensitive username match.
    async fn find_by_username(&self, username: &str) -> Result<Option<LocalUser>, CustomError>;
}

pub struct MongoUserDirectory {
    collection: Collection<LocalUser>,
}

impl MongoUserDirectory {
    pub fn new(db: &Database) -> Self {
        MongoUserDirectory {
            collection: db.collection::<LocalUser>("users"),
        }
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<LocalUser>, CustomError> {
        self.collection
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Failed to fetch user: {}", e)))
    }
}
