use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::env;
use std::path::PathBuf;
use tokio::fs;

use crate::utils::uploads::FileUpload;

/// Generic storage for forum attachments.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `file` under `name` and returns its public URL.
    async fn store(&self, name: &str, file: FileUpload) -> Result<String, String>;
}

/// Local media directory configuration
#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    pub media_root: PathBuf,
    pub media_url: String,
}

impl LocalStorageConfig {
    pub fn from_env() -> Self {
        Self {
            media_root: PathBuf::from(
                env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string()),
            ),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
        }
    }
}

/// Stores uploads in a directory served under `media_url`.
pub struct LocalFileStorage {
    config: LocalStorageConfig,
}

impl LocalFileStorage {
    pub fn new(config: LocalStorageConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, name: &str, file: FileUpload) -> Result<String, String> {
        fs::create_dir_all(&self.config.media_root)
            .await
            .map_err(|e| format!("Failed to create media directory: {}", e))?;

        let path = self.config.media_root.join(name);
        fs::write(&path, &file.data)
            .await
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

        Ok(format!(
            "{}/{}",
            self.config.media_url.trim_end_matches('/'),
            name
        ))
    }
}

/// Cloudinary configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
}

impl CloudinaryConfig {
    /// Load Cloudinary configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .map_err(|_| "CLOUDINARY_CLOUD_NAME is required")?,
            api_key: env::var("CLOUDINARY_API_KEY")
                .map_err(|_| "CLOUDINARY_API_KEY is required")?,
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .map_err(|_| "CLOUDINARY_API_SECRET is required")?,
            folder: env::var("CLOUDINARY_FOLDER").ok(),
        })
    }

    /// Upload URL for raw resources
    pub fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/raw/upload",
            self.cloud_name
        )
    }

    /// Generate a signature for authenticated uploads
    pub fn generate_signature(&self, params: &str, timestamp: i64) -> String {
        let to_sign = format!("{}&timestamp={}{}", params, timestamp, self.api_secret);
        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Signed parameters in alphabetical order, as Cloudinary expects.
    fn signed_params(&self, public_id: &str) -> String {
        match &self.folder {
            Some(folder) => format!("folder={}&public_id={}", folder, public_id),
            None => format!("public_id={}", public_id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorResponse {
    error: CloudinaryError,
}

/// Stores uploads as raw Cloudinary resources.
pub struct CloudinaryStorage {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryStorage {
    pub fn new() -> Result<Self, String> {
        let config = CloudinaryConfig::from_env()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: CloudinaryConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }
}

#[async_trait]
impl FileStorage for CloudinaryStorage {
    async fn store(&self, name: &str, file: FileUpload) -> Result<String, String> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self
            .config
            .generate_signature(&self.config.signed_params(name), timestamp);

        let mime = file
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_part = Part::bytes(file.data)
            .file_name(name.to_string())
            .mime_str(&mime)
            .map_err(|e| format!("Failed to create file part: {}", e))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("public_id", name.to_string())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature);

        if let Some(folder) = &self.config.folder {
            form = form.text("folder", folder.clone());
        }

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Failed to send upload request: {}", e))?;

        if response.status().is_success() {
            response
                .json::<CloudinaryUploadResponse>()
                .await
                .map(|uploaded| uploaded.secure_url)
                .map_err(|e| format!("Failed to parse upload response: {}", e))
        } else {
            let error_response = response
                .json::<CloudinaryErrorResponse>()
                .await
                .map_err(|e| format!("Failed to parse error response: {}", e))?;
            Err(format!(
                "Cloudinary upload failed: {}",
                error_response.error.message
            ))
        }
    }
}
