//! Suggestion Formatter: turns uncovered requirements into the user-facing report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::suggestion::coverage::CoverageResult;

pub const NO_BULLETS_MESSAGE: &str = "No job bullets detected in the description.";
pub const FULLY_COVERED_MESSAGE: &str =
    "✅ Your resume already covers most points from the job description!";
pub const MISSING_LEAD_IN: &str = "Consider adding the following keywords/points:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The job description produced no requirement bullets.
    NoBullets,
    /// Every deduplicated requirement is covered by the resume.
    FullyCovered,
    /// At least one requirement is missing from the resume.
    Missing,
}

/// Final, ordered list of uncovered requirement texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub outcome: ReportOutcome,
    pub missing: Vec<String>,
}

impl SuggestionReport {
    pub fn no_bullets() -> Self {
        Self {
            outcome: ReportOutcome::NoBullets,
            missing: vec![],
        }
    }

    /// Keeps input order; no reordering or further deduplication.
    pub fn from_missing(missing: Vec<String>) -> Self {
        let outcome = if missing.is_empty() {
            ReportOutcome::FullyCovered
        } else {
            ReportOutcome::Missing
        };
        Self { outcome, missing }
    }

    pub fn from_coverage(results: &[CoverageResult]) -> Self {
        Self::from_missing(
            results
                .iter()
                .filter(|r| !r.covered)
                .map(|r| r.bullet.text.clone())
                .collect(),
        )
    }

    pub fn has_suggestions(&self) -> bool {
        self.outcome == ReportOutcome::Missing
    }
}

impl fmt::Display for SuggestionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            ReportOutcome::NoBullets => f.write_str(NO_BULLETS_MESSAGE),
            ReportOutcome::FullyCovered => f.write_str(FULLY_COVERED_MESSAGE),
            ReportOutcome::Missing => {
                write!(f, "{MISSING_LEAD_IN}\n\n")?;
                let items: Vec<String> = self.missing.iter().map(|m| format!("• {m}")).collect();
                f.write_str(&items.join("\n\n"))
            }
        }
    }
}
