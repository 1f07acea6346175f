//! API error types and handling

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use imgcap_core::{CompressError, DecodeError, EncodeError};
use serde_json::json;
use thiserror::Error;

/// Message returned when no quality step fits the budget.
pub const BUDGET_UNREACHABLE_MESSAGE: &str =
    "could not compress the image to the requested size without losing too much quality";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no image was provided")]
    MissingImage,

    #[error("no file was selected")]
    EmptyFilename,

    /// Moderation denied the upload; carries the verdict reason
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Encode(#[from] EncodeError),

    #[error("{}", BUDGET_UNREACHABLE_MESSAGE)]
    BudgetUnreachable,

    #[error("{0}")]
    Internal(String),
}

impl From<CompressError> for ApiError {
    fn from(err: CompressError) -> Self {
        match err {
            CompressError::Encode(e) => ApiError::Encode(e),
            CompressError::BudgetUnreachable { .. } => ApiError::BudgetUnreachable,
        }
    }
}

impl ApiError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::EmptyFilename | ApiError::Rejected(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Multipart(e) => e.status(),
            ApiError::Decode(_)
            | ApiError::Encode(_)
            | ApiError::BudgetUnreachable
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "upload failed");
        } else {
            tracing::info!(error = %self, %status, "upload rejected");
        }

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
