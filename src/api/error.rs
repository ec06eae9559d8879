//! API error taxonomy
//!
//! Every handler failure goes through [`ApiError`], which owns the one static
//! table from error kind to HTTP status and numeric error code.

use crate::core::{TransformationError, ValidationResult};
use crate::storage::RepositoryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to parse JSON: {0}")]
    Json(String),
    #[error("repository issue: {0}")]
    RepositoryIssue(String),
    #[error("not available on a restricted node")]
    NonProduction,
    #[error("unsupported")]
    Unsupported,
    #[error("invalid address")]
    InvalidAddress,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid encoding")]
    InvalidEncoding,
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),
    #[error("transformation error: {0}")]
    TransformationError(String),
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("public key not found")]
    PublicKeyNotFound,
    #[error("transaction invalid: {0}")]
    TransactionInvalid(ValidationResult),
}

/// Error body: `{"error": code, "message": text}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: u16,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Json(_) => StatusCode::BAD_REQUEST,
            ApiError::RepositoryIssue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NonProduction => StatusCode::FORBIDDEN,
            ApiError::Unsupported => StatusCode::NOT_IMPLEMENTED,
            ApiError::InvalidAddress
            | ApiError::InvalidPublicKey
            | ApiError::InvalidEncoding
            | ApiError::InvalidCriteria(_)
            | ApiError::TransformationError(_)
            | ApiError::InvalidPrivateKey
            | ApiError::TransactionInvalid(_) => StatusCode::BAD_REQUEST,
            ApiError::PublicKeyNotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Numeric code consumed by existing clients
    pub fn code(&self) -> u16 {
        match self {
            ApiError::Json(_) => 1,
            ApiError::RepositoryIssue(_) => 5,
            ApiError::NonProduction => 6,
            ApiError::Unsupported => 9,
            ApiError::InvalidAddress => 102,
            ApiError::InvalidPublicKey => 103,
            ApiError::InvalidEncoding => 104,
            ApiError::InvalidCriteria(_) => 107,
            ApiError::TransformationError(_) => 109,
            ApiError::InvalidPrivateKey => 110,
            ApiError::PublicKeyNotFound => 302,
            ApiError::TransactionInvalid(_) => 303,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("API error: {}", self);
        } else {
            log::debug!("API request rejected: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::RepositoryIssue(err.to_string())
    }
}

impl From<TransformationError> for ApiError {
    fn from(err: TransformationError) -> Self {
        ApiError::TransformationError(err.to_string())
    }
}
