//! Error types shared by the stores, the content tools and the HTTP layer.
//!
//! Content-availability problems are not errors at the catalog level (they
//! degrade to empty sets); they only surface here once a round cannot be built.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Not enough candidates to assemble a round.
    #[error("Not enough content for language '{language}': {available} candidate(s), need at least {required}")]
    InsufficientContent {
        language: String,
        available: usize,
        required: usize,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking worker panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The game front end only looks for an `error` string, so every variant shares one shape.
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
