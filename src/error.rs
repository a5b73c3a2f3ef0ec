//! Application error type and its HTTP mapping.
use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::repo::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(BTreeMap<&'static str, String>),

    #[error("The email, {0}, already exists!")]
    DuplicateEmail(String),

    #[error("User not found!")]
    UserNotFound,

    #[error("Password incorrect!")]
    InvalidPassword,

    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("token signing failed: {0}")]
    TokenSigning(String),

    #[error("Unauthorized")]
    TokenInvalid,

    #[error("user store error: {0}")]
    Store(#[source] RepoError),
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateEmail(email) => AppError::DuplicateEmail(email),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail(_) | AppError::InvalidPassword => {
                StatusCode::BAD_REQUEST
            }
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::HashingFailure(_) | AppError::TokenSigning(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Validation(fields) => (status, Json(json!(fields))).into_response(),
            AppError::DuplicateEmail(_) | AppError::UserNotFound => {
                (status, Json(json!({ "email": self.to_string() }))).into_response()
            }
            AppError::InvalidPassword => {
                (status, Json(json!({ "password": self.to_string() }))).into_response()
            }
            AppError::TokenInvalid => (status, "Unauthorized").into_response(),
            AppError::HashingFailure(_) | AppError::TokenSigning(_) | AppError::Store(_) => {
                error!(error = %self, "internal error");
                (status, Json(json!({ "error": "Internal server error" }))).into_response()
            }
        }
    }
}
