//! Coverage Scorer: does any resume line semantically cover each requirement?

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::{cosine_similarity, embed_checked, EmbeddingError, EmbeddingProvider};
use crate::suggestion::extractor::{Bullet, ResumeLine};

pub const DEFAULT_COVER_THRESHOLD: f32 = 0.35;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageResult {
    pub bullet: Bullet,
    /// Max cosine similarity against any resume line, in [-1, 1].
    /// `None` when there were no resume lines to compare against.
    pub best_score: Option<f32>,
    /// Index into the resume lines of the best-scoring line.
    pub best_line: Option<usize>,
    pub covered: bool,
}

/// Scores each bullet against every resume line. One provider call per list.
///
/// Covered iff the best score is `>= threshold`. With no resume lines every
/// bullet is uncovered.
pub async fn score_coverage(
    provider: &dyn EmbeddingProvider,
    bullets: &[Bullet],
    resume_lines: &[ResumeLine],
    threshold: f32,
) -> Result<Vec<CoverageResult>, EmbeddingError> {
    let bullet_texts: Vec<String> = bullets.iter().map(|b| b.text.clone()).collect();
    let line_texts: Vec<String> = resume_lines.iter().map(|l| l.text.clone()).collect();

    let bullet_embs = embed_checked(provider, &bullet_texts).await?;
    let line_embs = embed_checked(provider, &line_texts).await?;

    if let (Some(b), Some(l)) = (bullet_embs.first(), line_embs.first()) {
        if b.len() != l.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: b.len(),
                got: l.len(),
            });
        }
    }

    let results: Vec<CoverageResult> = bullets
        .iter()
        .zip(&bullet_embs)
        .map(|(bullet, emb)| {
            let best = best_match(emb, &line_embs);
            CoverageResult {
                bullet: bullet.clone(),
                best_score: best.map(|(_, s)| s),
                best_line: best.map(|(i, _)| i),
                covered: best.is_some_and(|(_, s)| s >= threshold),
            }
        })
        .collect();

    debug!(
        "Coverage: {}/{} bullets covered across {} resume lines (threshold={threshold})",
        results.iter().filter(|r| r.covered).count(),
        results.len(),
        resume_lines.len()
    );

    Ok(results)
}

/// Highest-similarity line; the earliest line wins ties.
fn best_match(query: &[f32], lines: &[Vec<f32>]) -> Option<(usize, f32)> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| (i, cosine_similarity(query, line)))
        .fold(None, |best, (i, s)| match best {
            Some((_, top)) if top >= s => best,
            _ => Some((i, s)),
        })
}
