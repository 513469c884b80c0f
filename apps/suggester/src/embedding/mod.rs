//! Embedding Provider: pluggable, trait-based text → vector capability.
//!
//! Production: `OpenAiEmbedder` (any OpenAI-compatible `/embeddings` endpoint).
//! Offline / tests: `HashingEmbedder` (deterministic feature hashing).
//!
//! The provider is built once at startup and shared as `Arc<dyn EmbeddingProvider>`.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub mod hashing;
pub mod openai;

#[cfg(test)]
pub mod testing;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed embedding output: {0}")]
    Malformed(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// The embedding provider trait. Implement this to swap backends without
/// touching the deduplicator, scorer, or caller code.
///
/// Implementations must be deterministic for identical input under a fixed
/// model version, and must return one vector per input text, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Short backend label for logs ("openai", "hashing", ...).
    fn name(&self) -> &str;
}

/// Embeds one batch and validates the shape of what came back.
///
/// An empty batch short-circuits without touching the provider.
pub async fn embed_checked(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let vectors = provider.embed(texts).await?;

    if vectors.len() != texts.len() {
        return Err(EmbeddingError::Malformed(format!(
            "{} returned {} vectors for {} inputs",
            provider.name(),
            vectors.len(),
            texts.len()
        )));
    }

    let dim = vectors[0].len();
    if dim == 0 {
        return Err(EmbeddingError::Malformed(format!(
            "{} returned zero-length vectors",
            provider.name()
        )));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dim,
            got: bad.len(),
        });
    }
    if let Some(index) = vectors
        .iter()
        .position(|v| v.iter().any(|x| !x.is_finite()))
    {
        return Err(EmbeddingError::Malformed(format!(
            "{} returned a non-finite component in vector {index}",
            provider.name()
        )));
    }

    debug!(
        "{} embedded {} texts (dim={dim})",
        provider.name(),
        texts.len()
    );
    Ok(vectors)
}

/// Cosine similarity between two vectors, clamped to [-1, 1].
/// Returns 0.0 when either vector has zero norm, the dimensions differ, or a
/// component is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let sim = dot / (na.sqrt() * nb.sqrt());
    if !sim.is_finite() {
        return 0.0;
    }
    sim.clamp(-1.0, 1.0) as f32
}
