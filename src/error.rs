//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::RoomNotFound(e) => {
                (StatusCode::NOT_FOUND, format!("Room not found: {}", e))
            }
            AppError::UserNotFound(e) => {
                (StatusCode::NOT_FOUND, format!("User not found: {}", e))
            }
            AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, e.clone()),
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
