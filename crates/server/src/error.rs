use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The uploaded payload could not be decoded as an image. Client
    /// fault, never a ranking attempt.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Embedding provider failed at query time; no embedding means no
    /// ranking is possible, so the whole request fails.
    #[error("embedding error: {0}")]
    Embed(#[from] embed::EmbedError),

    #[error("ranking error: {0}")]
    Rank(#[from] rank::RankError),

    #[error("index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    #[error("internal server error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidImage(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Embed(_)
            | ServerError::Rank(_)
            | ServerError::Index(_)
            | ServerError::Catalog(_)
            | ServerError::Internal(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::InvalidImage(_) => "INVALID_IMAGE",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Embed(_) => "EMBED_ERROR",
            ServerError::Rank(_) => "RANK_ERROR",
            ServerError::Index(_) => "INDEX_ERROR",
            ServerError::Catalog(_) => "CATALOG_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
