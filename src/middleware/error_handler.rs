use actix_web::error::{QueryPayloadError, UrlencodedError};
use actix_web::{Error, HttpRequest, web};

use crate::utils::error::CustomError;

fn form_error_handler(err: UrlencodedError, _req: &HttpRequest) -> Error {
    log::debug!("Rejecting malformed form payload: {}", err);
    CustomError::BadRequestError(format!("Invalid form payload: {}", err)).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    CustomError::BadRequestError(format!("Invalid query string: {}", err)).into()
}

/// Form extractor settings that keep malformed payloads inside the errors envelope.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(form_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}
