use crate::database::RedisService;
use crate::utils::error::CustomError;
use actix_web::{Error, HttpMessage, HttpRequest, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Claims of the LMS-issued access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub exp: usize,
}

/// Verify JWT token and validate session in Redis
pub async fn verify_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let token = credentials.token();
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());

    let token_data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data,
        Err(_) => {
            return Err((
                CustomError::UnauthenticatedError("Invalid token".to_string()).into(),
                req,
            ));
        }
    };

    let user_id = &token_data.claims.id;

    let redis_service = match req.app_data::<web::Data<RedisService>>() {
        Some(service) => service,
        None => {
            // No session store configured: the signed token is enough.
            req.extensions_mut().insert(token_data.claims);
            return Ok(req);
        }
    };

    match redis_service.validate_session(token).await {
        Ok(Some(stored_user_id)) if stored_user_id == *user_id => {
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
        Ok(Some(_)) => Err((
            CustomError::UnauthenticatedError("Session mismatch".to_string()).into(),
            req,
        )),
        Ok(None) => Err((
            CustomError::UnauthenticatedError("Session expired or invalid".to_string()).into(),
            req,
        )),
        Err(e) => {
            log::warn!("Session store unavailable, accepting signed token: {}", e);
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
    }
}

/// The authenticated caller (use after auth middleware)
pub fn current_user(req: &HttpRequest) -> Result<Claims, CustomError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| CustomError::UnauthenticatedError("Not authenticated".to_string()))
}
