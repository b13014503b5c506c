use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use adapters::AdapterError;
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors. Every 4xx/5xx answer carries a single `detail` message.
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Adapter(AdapterError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
    NotFound(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "{}", e),
            Self::Adapter(e) => write!(f, "{}", e),
            Self::Validation(e) => write!(f, "Validation failed: {}", e),
            Self::BadRequest(msg) => write!(f, "{}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::NotFound(msg) => write!(f, "{}", msg),
        }
    }
}

impl ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::IllegalValue(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Adapter(AdapterError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Adapter(AdapterError::Unauthorized | AdapterError::Forbidden) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Adapter(AdapterError::Upstream { .. } | AdapterError::Transport(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Adapter(err @ (AdapterError::Upstream { .. } | AdapterError::Transport(_))) =
            self
        {
            tracing::error!(error = %err, "external adapter unavailable");
        }
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<AdapterError> for WebError {
    fn from(error: AdapterError) -> Self {
        Self::Adapter(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = std::result::Result<T, WebError>;
