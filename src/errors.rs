use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Everything a request can fail with. Translated to a JSON response at the
/// boundary; nothing is retried or recovered further up the stack.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("all fields are required")]
    MissingFields,
    #[error("only image files are allowed")]
    UnsupportedFileType,
    #[error("file exceeds the 5 MiB upload limit")]
    FileTooLarge,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid entry id")]
    InvalidId,
    #[error("entry not found")]
    NotFound,
    #[error("storage failure: {0}")]
    Persistence(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingFields
            | ApiError::UnsupportedFileType
            | ApiError::FileTooLarge
            | ApiError::BadRequest(_)
            | ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ApiError::Persistence(detail) => json!({
                "message": "internal server error",
                "error": detail,
            }),
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
