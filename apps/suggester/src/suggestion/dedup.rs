//! Bullet Deduplicator: greedy single-pass clustering of near-duplicate bullets.
//!
//! Each bullet joins the first existing cluster (in creation order) whose
//! representative is at least `threshold` similar, or opens a new one.
//! Order-dependent and not globally optimal; output is deterministic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::{cosine_similarity, embed_checked, EmbeddingError, EmbeddingProvider};
use crate::suggestion::extractor::Bullet;

pub const DEFAULT_CLUSTER_THRESHOLD: f32 = 0.8;

/// A group of bullets judged equivalent. Indices point into the input slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// First member; its vector is the one later bullets are compared against.
    pub representative: usize,
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deduplicated {
    pub clusters: Vec<Cluster>,
    /// One bullet per cluster, in cluster-creation order.
    pub representatives: Vec<Bullet>,
}

/// Partitions `embeddings` into clusters. Pure; no provider involved.
pub fn cluster_bullets(embeddings: &[Vec<f32>], threshold: f32) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();

    for (i, emb) in embeddings.iter().enumerate() {
        let home = clusters
            .iter_mut()
            .find(|c| cosine_similarity(&embeddings[c.representative], emb) >= threshold);
        match home {
            Some(cluster) => cluster.members.push(i),
            None => clusters.push(Cluster {
                representative: i,
                members: vec![i],
            }),
        }
    }

    clusters
}

/// Embeds all bullets in one batch and keeps one representative per cluster.
pub async fn deduplicate(
    provider: &dyn EmbeddingProvider,
    bullets: &[Bullet],
    threshold: f32,
) -> Result<Deduplicated, EmbeddingError> {
    let texts: Vec<String> = bullets.iter().map(|b| b.text.clone()).collect();
    let embeddings = embed_checked(provider, &texts).await?;

    let clusters = cluster_bullets(&embeddings, threshold);
    let representatives = clusters
        .iter()
        .map(|c| bullets[c.representative].clone())
        .collect::<Vec<_>>();

    debug!(
        "Deduplicated {} bullets into {} clusters (threshold={threshold})",
        bullets.len(),
        clusters.len()
    );

    Ok(Deduplicated {
        clusters,
        representatives,
    })
}
