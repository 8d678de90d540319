//! HTTP mapping for engine and prompt errors.

use aethon_prompt::PromptError;
use aethon_rag::RagError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error ready to be rendered as a JSON HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rag(#[from] RagError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Rag(e) => match e {
                RagError::Extraction(_) | RagError::Config(_) => StatusCode::BAD_REQUEST,
                RagError::NotReady => StatusCode::CONFLICT,
                RagError::EmptyIndex => StatusCode::UNPROCESSABLE_ENTITY,
                RagError::Embedding { .. } => StatusCode::BAD_GATEWAY,
                RagError::DimensionMismatch { .. }
                | RagError::DegenerateVector
                | RagError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Prompt(e) => match e {
                PromptError::UnknownTest(_) => StatusCode::NOT_FOUND,
                PromptError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_expected_statuses() {
        let cases = [
            (ApiError::from(RagError::Extraction("bad".into())), StatusCode::BAD_REQUEST),
            (ApiError::from(RagError::NotReady), StatusCode::CONFLICT),
            (ApiError::from(RagError::EmptyIndex), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ApiError::from(RagError::Embedding { provider: "x".into(), message: "y".into() }),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::from(PromptError::UnknownTest("t".into())), StatusCode::NOT_FOUND),
        ];
        for (error, expected) in cases {
            assert_eq!(error.status(), expected);
        }
    }
}
