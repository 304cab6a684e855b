//! # error
//!
//! Centralised application error type.
//!
//! Every handler returns `Result<_, AppError>`.  Axum's `IntoResponse` impl
//! converts these into structured JSON error bodies so the frontend always
//! gets a machine-readable response even on failure.
//!
//! All domain errors are recoverable and reported directly to the caller;
//! none are fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was syntactically correct but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested symbol does not exist in the catalog.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// BUY rejected — cash balance does not cover the order total.
    #[error("Insufficient balance: need {required:.2}, have {available:.2}")]
    InsufficientBalance { required: f64, available: f64 },

    /// SELL rejected — position does not cover the requested quantity.
    #[error("Insufficient quantity: want to sell {requested}, hold {held}")]
    InsufficientQuantity { requested: i64, held: i64 },

    /// Registration rejected — the email is already taken.
    #[error("Email already registered: {0}")]
    DuplicateRegistration(String),

    /// Login rejected — unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing or expired session token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Persistent store failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownSymbol(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientQuantity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateRegistration(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "ok":    false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
