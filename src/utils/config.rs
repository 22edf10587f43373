use std::env;

use crate::utils::uploads::FileValidator;

/// Which backend stores forum uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    Cloudinary,
}

/// Behaviour switches of the discussion handlers
#[derive(Debug, Clone)]
pub struct ForumSettings {
    /// `None` leaves reply nesting unlimited; a negative value forbids even
    /// top-level responses.
    pub max_comment_depth: Option<i64>,
    pub upload_policy: FileValidator,
}

impl Default for ForumSettings {
    fn default() -> Self {
        Self {
            max_comment_depth: None,
            upload_policy: FileValidator::images(),
        }
    }
}

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub notifications_enabled: bool,
    pub storage: StorageKind,
    pub forum: ForumSettings,
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let max_comment_depth = match env::var("MAX_COMMENT_DEPTH") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| "MAX_COMMENT_DEPTH must be an integer")?,
            ),
            _ => None,
        };

        let mut upload_policy = FileValidator::images();
        if let Ok(raw) = env::var("MAX_UPLOAD_FILE_SIZE") {
            upload_policy = upload_policy.with_max_size(
                raw.trim()
                    .parse()
                    .map_err(|_| "MAX_UPLOAD_FILE_SIZE must be a number of bytes")?,
            );
        }
        if let Ok(raw) = env::var("ALLOWED_UPLOAD_FILE_TYPES") {
            let types: Vec<&str> = raw.split(',').collect();
            upload_policy = upload_policy.with_extensions(types.as_slice());
        }

        let storage = match env::var("UPLOAD_STORAGE")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "local" => StorageKind::Local,
            "cloudinary" => StorageKind::Cloudinary,
            other => return Err(format!("Unknown UPLOAD_STORAGE '{}'", other)),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| "PORT must be a valid number")?,
            notifications_enabled: env_flag("NOTIFICATIONS_ENABLED"),
            storage,
            forum: ForumSettings {
                max_comment_depth,
                upload_policy,
            },
        })
    }
}
