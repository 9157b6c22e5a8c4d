use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog::CatalogError;
use serde_json::{json, Value};
use streaming::PresenceError;
use tracing::error;

pub fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing request parameters.
    #[error("{0}")]
    Validation(String),
    /// Server-side configuration is incomplete.
    #[error("{0}")]
    Config(String),
    #[error(transparent)]
    Upstream(#[from] PresenceError),
    #[error(transparent)]
    File(#[from] CatalogError),
    /// Boundary geometry missing or unreadable.
    #[error("{0}")]
    Geometry(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::File(CatalogError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            ApiError::File(CatalogError::NotFound { .. } | CatalogError::UnknownDataset(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Config(_)
            | ApiError::Upstream(_)
            | ApiError::File(_)
            | ApiError::Geometry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::File(_) | ApiError::Geometry(_) = &self {
            if status.is_server_error() {
                error!(error = %self, "data file unavailable");
            }
        }
        api_error(status, self.to_string()).into_response()
    }
}
