use thiserror::Error;

use crate::error::{ErrorMessage, HttpError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{}", ErrorMessage::InsufficientFunds)]
    InsufficientFunds,

    #[error("{}", ErrorMessage::InvalidHmac)]
    InvalidHmac,
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => {
                tracing::error!("database error: {}", e);
                HttpError::server_error("Internal server error")
            }
            ServiceError::Gateway(msg) => {
                tracing::error!("payment gateway error: {}", msg);
                HttpError::server_error("Payment gateway unavailable")
            }
            ServiceError::Validation(msg) => HttpError::bad_request(msg),
            ServiceError::NotFound(msg) => HttpError::not_found(msg),
            ServiceError::Forbidden(msg) => HttpError::forbidden(msg),
            ServiceError::Conflict(msg) => HttpError::conflict(msg),
            ServiceError::InsufficientFunds => {
                HttpError::payment_required(ErrorMessage::InsufficientFunds.to_string())
            }
            ServiceError::InvalidHmac => {
                HttpError::unauthorized(ErrorMessage::InvalidHmac.to_string())
            }
        }
    }
}
