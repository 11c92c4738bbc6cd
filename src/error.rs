use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// StoreError
///
/// Failures surfaced by an `ArticleRepository`. The route layer decides the HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("article not found")]
    NotFound,
    #[error("failed to read article record {id}: {reason}")]
    Read { id: String, reason: String },
    #[error("failed to write article record {id}: {source}")]
    Write {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove article record {id}: {source}")]
    Remove {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to scan article directory: {0}")]
    Scan(#[source] std::io::Error),
}

/// AppError
///
/// Everything a handler can fail with once validation errors have been handled locally.
/// Bodies stay generic; details go to the log.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid article id")]
    InvalidIdentifier,
    #[error("article not found")]
    NotFound,
    #[error(transparent)]
    Store(StoreError),
    #[error("failed to render view: {0}")]
    Render(#[from] askama::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidIdentifier => (StatusCode::BAD_REQUEST, "Invalid article id"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Article not found"),
            AppError::Store(StoreError::Read { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error reading article")
            }
            AppError::Store(StoreError::Scan(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error reading articles")
            }
            AppError::Store(StoreError::Remove { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting article")
            }
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error saving article"),
            AppError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering page"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, body).into_response()
    }
}
