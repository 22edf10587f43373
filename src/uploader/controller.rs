use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde::Serialize;
use url::Url;

use crate::middleware::auth::current_user;
use crate::state::AppState;
use crate::utils::error::CustomError;
use crate::utils::helpers::generate_upload_base_name;
use crate::utils::model::CoursePath;
use crate::utils::uploads::{FileUpload, FileValidator};

/// Multipart field carrying the attachment.
const UPLOAD_FIELD: &str = "file-upload";

const GENERIC_UPLOAD_ERROR: &str =
    "Error uploading file. Please contact the site administrator. Thank you.";

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub msg: String,
    pub error: String,
    pub file_url: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub result: UploadResult,
}

/// Why an upload did not produce a URL.
enum UploadFailure {
    /// Safe to show to the uploader as is.
    Rejected(String),
    /// Logged; the uploader only sees the generic message.
    Unexpected(String),
}

/// Helper function to extract the attachment from the multipart form.
/// Reading stops as soon as the field grows past `policy.max_file_size`.
async fn extract_upload(
    mut payload: Multipart,
    policy: &FileValidator,
) -> Result<Option<FileUpload>, UploadFailure> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            UploadFailure::Unexpected(format!("Error reading multipart field: {}", e))
        })?;

        let content_disposition = match field.content_disposition() {
            Some(cd) => cd,
            None => continue,
        };

        if content_disposition.get_name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = content_disposition
            .get_filename()
            .map(|f| f.to_string())
            .unwrap_or_default();
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                UploadFailure::Unexpected(format!("Error reading file chunk: {}", e))
            })?;
            if data.len() + chunk.len() > policy.max_file_size {
                return Err(UploadFailure::Rejected(policy.size_message()));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(Some(FileUpload::new(file_name, data, content_type)));
    }

    Ok(None)
}

/// Drops the query string and fragment of a storage URL.
pub fn strip_query_and_fragment(file_url: &str) -> String {
    match Url::parse(file_url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => file_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

async fn store_upload(state: &AppState, payload: Multipart) -> Result<String, UploadFailure> {
    let policy = &state.settings.upload_policy;
    let file = extract_upload(payload, policy).await?.ok_or_else(|| {
        UploadFailure::Unexpected(format!("No file uploaded with key '{}'", UPLOAD_FIELD))
    })?;

    policy.validate(&file).map_err(UploadFailure::Rejected)?;

    let extension = file.extension().unwrap_or_default();
    let name = format!("{}.{}", generate_upload_base_name(), extension);

    let file_url = state
        .storage
        .store(&name, file)
        .await
        .map_err(UploadFailure::Unexpected)?;

    Ok(strip_query_and_fragment(&file_url))
}

/// Stores a forum attachment
/// POST /courses/{org}/{course}/{run}/discussion/upload
pub async fn upload(
    req: HttpRequest,
    path: web::Path<CoursePath>,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;

    let result = match store_upload(&state, payload).await {
        Ok(file_url) => UploadResult {
            msg: "Good".to_string(),
            error: String::new(),
            file_url,
        },
        Err(UploadFailure::Rejected(message)) => UploadResult {
            msg: String::new(),
            error: message,
            file_url: String::new(),
        },
        Err(UploadFailure::Unexpected(detail)) => {
            log::error!(
                "Upload by user {} in {} failed: {}",
                user.id,
                course_key,
                detail
            );
            UploadResult {
                msg: String::new(),
                error: GENERIC_UPLOAD_ERROR.to_string(),
                file_url: String::new(),
            }
        }
    };

    Ok(HttpResponse::Ok().json(UploadResponse { result }))
}
