use axum::http::StatusCode;
use thiserror::Error;

/// Failures raised by a persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Please log in")]
    Unauthorized,

    #[error("Incorrect email or password.")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Service temporarily unavailable, please try again")]
    StoreUnavailable(#[from] StoreError),
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized | ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs infrastructure failures with full detail; the caller only ever
    /// sees the generic `Display` text.
    pub fn log(&self) {
        if let ServiceError::StoreUnavailable(inner) = self {
            tracing::error!(error = %inner, "store failure");
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}
