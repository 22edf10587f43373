use thiserror::Error;

/// Failures talking to the comment service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered 404 for the named resource kind.
    #[error("{0} not found")]
    NotFound(String),

    #[error("Comment service returned {status}: {message}")]
    Request { status: u16, message: String },

    #[error("Comment service transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Comment service payload error: {0}")]
    Decode(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
