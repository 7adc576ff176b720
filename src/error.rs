use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Failure envelope returned by every error path.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Field-level input errors, `{field: [messages]}`.
    #[error("invalid input data")]
    Validation(serde_json::Value),
    #[error("email address already exists")]
    DuplicateEmail,
    #[error("user {0} not found")]
    NotFound(Uuid),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("search query required")]
    EmptyQuery,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    details: Some(details),
                    ..ErrorBody::new("Validation error", "Invalid input data")
                },
            ),
            // `/register` remaps this one to 409; the user CRUD boundary
            // reports duplicates as plain bad requests.
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Duplicate email", "Email address already exists"),
            ),
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(
                    "User not found",
                    &format!("User with ID {} does not exist", id),
                ),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Invalid credentials", "Invalid credentials"),
            ),
            ApiError::EmptyQuery => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(
                    "Search query required",
                    "Please provide a search query using ?q=search_term",
                ),
            ),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Internal server error", "Internal server error"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
