use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

const DEFAULT_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "lms";

/// Where the LMS-side accounts, courses and forum roles live.
#[derive(Debug, Clone, PartialEq)]
pub struct MongoSettings {
    pub uri: String,
    pub database: String,
}

impl MongoSettings {
    /// Reads `MONGODB_URI` and `MONGODB_DATABASE`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("MONGODB_URI").ok(),
            std::env::var("MONGODB_DATABASE").ok(),
        )
    }

    fn from_vars(uri: Option<String>, database: Option<String>) -> Self {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        MongoSettings {
            uri: non_blank(uri).unwrap_or_else(|| DEFAULT_URI.to_string()),
            database: non_blank(database).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        }
    }
}

/// Connects, pings the server and hands back the LMS database the stores read from.
pub async fn connect_to_mongo(settings: &MongoSettings) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(&settings.uri).await?;
    client_options.app_name = Some("course_discussions".to_string());
    let client = Client::with_options(client_options)?;

    if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
        log::error!("Failed to reach MongoDB at {}: {}", settings.uri, e);
        return Err(e);
    }

    log::info!("Connected to MongoDB database '{}'", settings.database);
    Ok(client.database(&settings.database))
}
