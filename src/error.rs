use crate::models::EndpointId;
use thiserror::Error;

/// Errors surfaced by the endpoint and group services.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data store: {0}")]
    Parse(String),

    #[error("endpoint {0} not found")]
    NotFound(EndpointId),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
