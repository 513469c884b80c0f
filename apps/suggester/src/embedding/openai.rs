//! OpenAI-compatible embeddings client.
//!
//! Inputs are sent in chunks of at most `batch_size`, one HTTP request per
//! chunk. Each request is retried on 429, 5xx, timeouts and connect errors,
//! up to `max_attempts` tries in total.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingError, EmbeddingProvider};
use crate::retry::{send_with_retry, RetryPolicy, SendError};

const BASE_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub dimensions: Option<usize>,
    pub timeout: Duration,
    /// Tries per chunk, first one included.
    pub max_attempts: u32,
    /// Inputs per HTTP request.
    pub batch_size: usize,
}

#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: Option<usize>,
    retry: RetryPolicy,
    batch_size: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

impl From<SendError> for EmbeddingError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Http(e) => EmbeddingError::Http(e),
            SendError::Status { status, body, .. } => EmbeddingError::Api {
                status: status.as_u16(),
                message: serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body),
            },
        }
    }
}

impl OpenAiEmbedder {
    pub fn new(settings: OpenAiSettings) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", settings.base_url.trim_end_matches('/')),
            api_key: settings.api_key,
            model: settings.model,
            dimensions: settings.dimensions,
            retry: RetryPolicy::new(settings.max_attempts, BASE_BACKOFF),
            batch_size: settings.batch_size.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn embed_chunk(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };
        let response = send_with_retry(&self.retry, "Embedding call", || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await?;
        let body = response.text().await?;
        vectors_from_body(&body, inputs.len())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let chunks = texts.len().div_ceil(self.batch_size);
        let mut out = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(self.batch_size).enumerate() {
            debug!(
                "OpenAI embeddings request {}/{}: {} inputs, model={}",
                i + 1,
                chunks,
                chunk.len(),
                self.model
            );
            out.extend(self.embed_chunk(chunk).await?);
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Decodes a response body, restoring input order from `index`.
fn vectors_from_body(body: &str, expected: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut parsed: EmbeddingResponse = serde_json::from_str(body)?;
    parsed.data.sort_by_key(|d| d.index);
    if parsed.data.len() != expected {
        return Err(EmbeddingError::Malformed(format!(
            "OpenAI returned {} embeddings for {} inputs",
            parsed.data.len(),
            expected
        )));
    }
    Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::retry::test_server::serve;

    #[test]
    fn test_vectors_sorted_by_index() {
        let body = r#"{"data": [
            {"embedding": [0.0, 1.0], "index": 1},
            {"embedding": [1.0, 0.0], "index": 0}
        ]}"#;
        let vectors = vectors_from_body(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let body = r#"{"data": [{"embedding": [1.0], "index": 0}]}"#;
        let err = vectors_from_body(body, 3).unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[test]
    fn test_garbage_body_is_parse_error() {
        let err = vectors_from_body("<html>bad gateway</html>", 1).unwrap_err();
        assert!(matches!(err, EmbeddingError::Parse(_)));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let embedder = OpenAiEmbedder::new(OpenAiSettings {
            api_key: "sk-test".to_string(),
            base_url: "http://localhost:8080/v1/".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            timeout: Duration::from_secs(5),
            max_attempts: 0,
            batch_size: 0,
        })
        .unwrap();
        assert_eq!(embedder.endpoint, "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.retry.max_attempts, 1);
        assert_eq!(embedder.batch_size, 1);
        assert_eq!(embedder.model(), "text-embedding-3-small");
    }

    fn settings(base_url: String, batch_size: usize) -> OpenAiSettings {
        OpenAiSettings {
            api_key: "sk-test".to_string(),
            base_url,
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            batch_size,
        }
    }

    fn fast(mut embedder: OpenAiEmbedder) -> OpenAiEmbedder {
        embedder.retry = RetryPolicy::new(embedder.retry.max_attempts, Duration::from_millis(1));
        embedder
    }

    #[tokio::test]
    async fn test_embed_retries_overloaded_server() {
        let ok = r#"{"data": [{"embedding": [0.6, 0.8], "index": 0}]}"#;
        let (url, hits) = serve(vec![(503, "overloaded".to_string()), (200, ok.to_string())]).await;
        let embedder = fast(OpenAiEmbedder::new(settings(url, 8)).unwrap());
        let vectors = embedder.embed(&["Rust".to_string()]).await.unwrap();
        assert_eq!(vectors, vec![vec![0.6, 0.8]]);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_embed_sends_one_request_per_chunk() {
        let ok = r#"{"data": [{"embedding": [1.0, 0.0], "index": 0}, {"embedding": [0.0, 1.0], "index": 1}]}"#;
        let (url, hits) = serve(vec![(200, ok.to_string())]).await;
        let embedder = fast(OpenAiEmbedder::new(settings(url, 2)).unwrap());
        let texts: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let vectors = embedder.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 4);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_embed_surfaces_api_error_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided"}}"#;
        let (url, hits) = serve(vec![(401, body.to_string())]).await;
        let embedder = fast(OpenAiEmbedder::new(settings(url, 8)).unwrap());
        let err = embedder.embed(&["Rust".to_string()]).await.unwrap_err();
        match err {
            EmbeddingError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
