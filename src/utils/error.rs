use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::client::error::ClientError;

/// Errors surfaced to discussion callers.
///
/// The display text is the user-facing message; it is rendered inside the
/// `{"errors": [...]}` envelope without any prefix.
#[allow(dead_code)]
#[derive(Debug, Error)]
pub enum CustomError {
    #[error("{0}")]
    UnauthorizedError(String),

    #[error("{0}")]
    BadRequestError(String),

    #[error("{0}")]
    InternalServerError(String),

    #[error("{0}")]
    UnauthenticatedError(String),

    #[error("{0}")]
    NotFoundError(String),

    #[error("{0}")]
    ValidationError(String),
}

impl CustomError {
    pub fn unauthorized() -> Self {
        CustomError::UnauthorizedError("unauthorized".to_string())
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::UnauthenticatedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "errors": [self.to_string()],
        }))
    }
}

impl From<ClientError> for CustomError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(what) => CustomError::NotFoundError(format!("{} not found", what)),
            other => {
                log::error!("Comment service call failed: {}", other);
                CustomError::InternalServerError("Comment service unavailable".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn renders_errors_envelope() {
        let err = CustomError::ValidationError("Title can't be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "errors": ["Title can't be empty"] }));
    }

    #[test]
    fn client_not_found_maps_to_404() {
        let err: CustomError = ClientError::NotFound("Thread".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Thread not found");
    }

    #[test]
    fn upstream_failures_hide_detail() {
        let err: CustomError = ClientError::Request {
            status: 503,
            message: "mongo exploded at shard 4".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("mongo"));
    }
}
