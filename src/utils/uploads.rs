/// A file received from a multipart form
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: String, data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            file_name,
            data,
            content_type,
        }
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercased extension without the leading dot
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

/// Size and type policy applied before a file reaches storage.
#[derive(Debug, Clone)]
pub struct FileValidator {
    /// Allowed file extensions without the dot (e.g. ["jpg", "png"])
    pub allowed_extensions: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: usize,
}

impl FileValidator {
    /// Image types accepted on forum posts, 4MB max
    pub fn images() -> Self {
        Self {
            allowed_extensions: ["jpg", "jpeg", "gif", "bmp", "png", "tiff"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_size: 4 * 1024 * 1024,
        }
    }

    /// Builder: Set allowed extensions, with or without leading dots
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.allowed_extensions = extensions
            .iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Builder: Set max file size in bytes
    pub fn with_max_size(mut self, size_bytes: usize) -> Self {
        self.max_file_size = size_bytes;
        self
    }

    fn extension_message(&self) -> String {
        let dotted: Vec<String> = self
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect();
        if dotted.len() == 1 {
            format!("The file must end with the extension '{}'.", dotted[0])
        } else {
            format!(
                "The file must end with one of the following extensions: '{}'.",
                dotted.join("', '")
            )
        }
    }

    pub fn size_message(&self) -> String {
        format!("Maximum upload file size is {} bytes.", self.max_file_size)
    }

    /// Validate a file; the error is safe to show to the uploader.
    pub fn validate(&self, file: &FileUpload) -> Result<(), String> {
        let allowed = file
            .extension()
            .is_some_and(|ext| self.allowed_extensions.contains(&ext));
        if !allowed {
            return Err(self.extension_message());
        }

        if file.size() > self.max_file_size {
            return Err(self.size_message());
        }

        Ok(())
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::images()
    }
}
