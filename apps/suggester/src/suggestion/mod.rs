// Suggestion engine: bullet extraction, semantic dedup, coverage scoring, report.
// All embedding calls go through the injected EmbeddingProvider, batched per list.

pub mod coverage;
pub mod dedup;
pub mod extractor;
pub mod report;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::errors::SuggestError;
use coverage::{score_coverage, CoverageResult, DEFAULT_COVER_THRESHOLD};
use dedup::{deduplicate, Cluster, DEFAULT_CLUSTER_THRESHOLD};
use extractor::{extract_bullets, split_resume_lines, Bullet, BulletPolicy};
use report::SuggestionReport;

/// Similarity cut-offs for one run. Both must lie in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum best-line similarity for a requirement to count as covered.
    pub cover: f32,
    /// Minimum similarity for a bullet to join an existing cluster.
    pub cluster: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cover: DEFAULT_COVER_THRESHOLD,
            cluster: DEFAULT_CLUSTER_THRESHOLD,
        }
    }
}

impl Thresholds {
    fn validate(&self) -> Result<(), SuggestError> {
        for (name, value) in [("cover", self.cover), ("cluster", self.cluster)] {
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(SuggestError::InvalidInput(format!(
                    "{name} threshold must be within [-1, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything one run produced, for diagnostics and JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub thresholds: Thresholds,
    pub extracted: Vec<Bullet>,
    pub clusters: Vec<Cluster>,
    pub deduplicated: Vec<Bullet>,
    pub coverage: Vec<CoverageResult>,
    pub report: SuggestionReport,
}

/// Suggestion pipeline with its embedding provider injected at construction.
/// Cheap to clone; the provider is shared read-only.
#[derive(Clone)]
pub struct Suggester {
    provider: Arc<dyn EmbeddingProvider>,
    policy: BulletPolicy,
}

impl Suggester {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, policy: BulletPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &BulletPolicy {
        &self.policy
    }

    /// Report of job requirements the resume does not cover.
    pub async fn suggest(
        &self,
        resume_text: &str,
        job_description: &str,
        thresholds: &Thresholds,
    ) -> Result<SuggestionReport, SuggestError> {
        Ok(self
            .analyze(resume_text, job_description, thresholds)
            .await?
            .report)
    }

    /// Full pipeline: extract → deduplicate → score → format.
    ///
    /// An empty resume is a caller error. A job description that is blank or
    /// has no recognizable bullets is a normal `NoBullets` report.
    pub async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
        thresholds: &Thresholds,
    ) -> Result<Analysis, SuggestError> {
        thresholds.validate()?;
        if resume_text.trim().is_empty() {
            return Err(SuggestError::InvalidInput(
                "Resume text is required".to_string(),
            ));
        }

        let extracted = extract_bullets(job_description, &self.policy);
        debug!("Extracted {} candidate bullets", extracted.len());

        if extracted.is_empty() {
            info!("No job bullets detected; skipping embedding");
            return Ok(Analysis {
                thresholds: *thresholds,
                extracted,
                clusters: vec![],
                deduplicated: vec![],
                coverage: vec![],
                report: SuggestionReport::no_bullets(),
            });
        }

        let provider = self.provider.as_ref();
        let deduped = deduplicate(provider, &extracted, thresholds.cluster).await?;

        let resume_lines = split_resume_lines(resume_text);
        let coverage = score_coverage(
            provider,
            &deduped.representatives,
            &resume_lines,
            thresholds.cover,
        )
        .await?;

        let report = SuggestionReport::from_coverage(&coverage);
        info!(
            "Suggestions ready: {} bullets, {} after dedup, {} missing (provider={})",
            extracted.len(),
            deduped.representatives.len(),
            report.missing.len(),
            provider.name()
        );

        Ok(Analysis {
            thresholds: *thresholds,
            extracted,
            clusters: deduped.clusters,
            deduplicated: deduped.representatives,
            coverage,
            report,
        })
    }
}
