//! Deterministic stub providers for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{EmbeddingError, EmbeddingProvider};

/// Returns a fixed vector per exact input text. Unknown text is an error.
pub struct LookupEmbedder {
    table: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
    drop_last: bool,
}

impl LookupEmbedder {
    pub fn new(entries: Vec<(&str, Vec<f32>)>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            calls: AtomicUsize::new(0),
            drop_last: false,
        }
    }

    /// Simulates a provider that loses the last vector of every batch.
    pub fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for LookupEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut out = texts
            .iter()
            .map(|t| {
                self.table
                    .get(t)
                    .cloned()
                    .ok_or_else(|| EmbeddingError::Malformed(format!("no vector for {t:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if self.drop_last {
            out.pop();
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "lookup"
    }
}

/// One axis per concept phrase (case-insensitive substring), plus a
/// catch-all axis for text that mentions none of them.
pub struct ConceptEmbedder {
    concepts: Vec<&'static str>,
    calls: AtomicUsize,
}

impl ConceptEmbedder {
    pub fn new(concepts: Vec<&'static str>) -> Self {
        Self {
            concepts,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for ConceptEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dim = self.concepts.len() + 1;
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                let mut v = vec![0.0; dim];
                for (i, c) in self.concepts.iter().enumerate() {
                    if lower.contains(c) {
                        v[i] = 1.0;
                    }
                }
                if v.iter().all(|x| *x == 0.0) {
                    v[dim - 1] = 1.0;
                }
                v
            })
            .collect())
    }

    fn name(&self) -> &str {
        "concept"
    }
}

/// Always fails, as an unavailable remote backend would.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 503,
            message: "model unavailable".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}
