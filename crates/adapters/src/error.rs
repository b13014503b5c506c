use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Got unknown status from {service} service: {status}.")]
    Upstream { service: &'static str, status: u16 },

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
