//! API Errors
//! Mission: One failure shape for every route
//!
//! Every error ends the current request. Store and token errors are mapped
//! here; token failures all collapse into `Unauthenticated` so clients never
//! learn why a token was refused.

use crate::auth::jwt::TokenError;
use crate::auth::user_store::StoreError;
use crate::tickets::store::TicketStoreError;
use axum::{
    extract::rejection::{FormRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

/// Body of a successful create
#[derive(Debug, Serialize)]
pub struct CreatedResponse<T> {
    pub id: T,
}

#[derive(Debug)]
pub enum ApiError {
    InvalidCredentials,
    Unauthenticated,
    DuplicateIdentifier,
    DuplicateEmail,
    WeakPassword { min_len: usize },
    BadRequest(String),
    Conflict(String),
    Unauthorized,
    NotFound,
    Internal,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Incorrect login id or password".to_string(),
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Please log in again".to_string(),
            ),
            ApiError::DuplicateIdentifier => (
                StatusCode::CONFLICT,
                "duplicate_identifier",
                "Login id is already registered".to_string(),
            ),
            ApiError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "duplicate_email",
                "Email is already registered".to_string(),
            ),
            ApiError::WeakPassword { min_len } => (
                StatusCode::BAD_REQUEST,
                "weak_password",
                format!("Password must be at least {} characters", min_len),
            ),
            ApiError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "bad_request", reason.clone())
            }
            ApiError::Conflict(reason) => (StatusCode::CONFLICT, "conflict", reason.clone()),
            ApiError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "unauthorized",
                "You do not own this ticket".to_string(),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Ticket not found".to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateIdentifier => ApiError::DuplicateIdentifier,
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            StoreError::WeakPassword { min_len } => ApiError::WeakPassword { min_len },
            StoreError::Database(e) => {
                error!("user store failure: {:#}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<TicketStoreError> for ApiError {
    fn from(e: TicketStoreError) -> Self {
        match e {
            TicketStoreError::NotFound => ApiError::NotFound,
            TicketStoreError::Unauthorized => ApiError::Unauthorized,
            TicketStoreError::Conflict(reason) => ApiError::Conflict(reason),
            TicketStoreError::Database(e) => {
                error!("ticket store failure: {:#}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        debug!("token rejected: {}", e);
        ApiError::Unauthenticated
    }
}

// Malformed input never reaches a handler; axum's plain-text rejections are
// rewritten into the common JSON shape.
impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        debug!("form rejected: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("path rejected: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!("request failed: {:#}", e);
        ApiError::Internal
    }
}
