use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Error type for the suggestion pipeline and its collaborators.
/// Implements `IntoResponse` so a service layer can return `Result<T, SuggestError>`.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(#[from] EmbeddingError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SuggestError {
    /// Caller mistakes are client errors; everything else is on our side.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SuggestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SuggestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            SuggestError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone()),
            SuggestError::Extraction(msg) => {
                tracing::error!("Extraction error: {msg}");
                (
                    "EXTRACTION_ERROR",
                    "Could not extract text from the document".to_string(),
                )
            }
            SuggestError::EmbeddingProvider(e) => {
                tracing::error!("Embedding provider error: {e}");
                (
                    "EMBEDDING_ERROR",
                    "The embedding service failed to process the text".to_string(),
                )
            }
            SuggestError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    "RENDER_ERROR",
                    "Could not render the document".to_string(),
                )
            }
            SuggestError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request_with_message() {
        let response =
            SuggestError::InvalidInput("Resume text is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert_eq!(body["error"]["message"], "Resume text is required");
    }

    #[tokio::test]
    async fn test_embedding_error_is_server_error() {
        let err = SuggestError::from(EmbeddingError::Malformed("2 vectors for 3 inputs".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "EMBEDDING_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_other_errors_map_to_500() {
        for err in [
            SuggestError::Extraction("bad xref".into()),
            SuggestError::Render("font".into()),
            SuggestError::Internal(anyhow::anyhow!("boom")),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_display_keeps_provider_detail() {
        let err = SuggestError::from(EmbeddingError::Api {
            status: 503,
            message: "overloaded".into(),
        });
        assert_eq!(
            err.to_string(),
            "Embedding provider error: API error (status 503): overloaded"
        );
    }
}
