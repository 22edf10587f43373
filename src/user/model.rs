use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// LMS account as stored in the `users` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocalUser {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct UsersQuery {
    pub username: Option<String>,
}

/// Entry of the user lookup response.
#[derive(Debug, Serialize, PartialEq)]
pub struct UserMatch {
    pub id: String,
    pub username: String,
}
