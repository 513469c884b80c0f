//! Resume rewriter: folds a suggestion report back into the resume text.
//!
//! Optional step. Rewriting must never fail the caller: any error, or an
//! empty reply, degrades to the original text.

pub mod prompts;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::suggestion::report::SuggestionReport;
use prompts::{build_rewrite_prompt, REWRITE_SYSTEM};

#[async_trait]
pub trait TextRewriter: Send + Sync {
    async fn try_rewrite(
        &self,
        original: &str,
        report: &SuggestionReport,
    ) -> Result<String, LlmError>;
}

pub struct LlmRewriter(pub LlmClient);

#[async_trait]
impl TextRewriter for LlmRewriter {
    async fn try_rewrite(
        &self,
        original: &str,
        report: &SuggestionReport,
    ) -> Result<String, LlmError> {
        let prompt = build_rewrite_prompt(original, &report.to_string());
        self.0.complete(&prompt, REWRITE_SYSTEM).await
    }
}

/// Rewritten text, or `original` unchanged when there is nothing to add or
/// the rewriter fails.
pub async fn rewrite_or_original(
    rewriter: &dyn TextRewriter,
    original: &str,
    report: &SuggestionReport,
) -> String {
    if !report.has_suggestions() {
        info!("Nothing missing from the resume; skipping rewrite");
        return original.to_string();
    }

    match rewriter.try_rewrite(original, report).await {
        Ok(text) if !text.trim().is_empty() => {
            info!("Rewrote resume ({} -> {} chars)", original.len(), text.len());
            text.trim().to_string()
        }
        Ok(_) => {
            warn!("Rewriter returned empty text; keeping original resume");
            original.to_string()
        }
        Err(e) => {
            warn!("Error rewriting resume: {e}; keeping original resume");
            original.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRewriter {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl StubRewriter {
        fn new(reply: Result<&'static str, u16>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextRewriter for StubRewriter {
        async fn try_rewrite(
            &self,
            _original: &str,
            _report: &SuggestionReport,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.map(str::to_string).map_err(|status| LlmError::Api {
                status,
                message: "upstream failure".to_string(),
            })
        }
    }

    fn missing() -> SuggestionReport {
        SuggestionReport::from_missing(vec!["Write unit tests".to_string()])
    }

    #[tokio::test]
    async fn test_successful_rewrite_is_returned_trimmed() {
        let stub = StubRewriter::new(Ok("  Built REST APIs with full unit test coverage.\n"));
        let out = rewrite_or_original(&stub, "Built REST APIs.", &missing()).await;
        assert_eq!(out, "Built REST APIs with full unit test coverage.");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original() {
        let stub = StubRewriter::new(Err(500));
        let out = rewrite_or_original(&stub, "Built REST APIs.", &missing()).await;
        assert_eq!(out, "Built REST APIs.");
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back_to_original() {
        let stub = StubRewriter::new(Ok("   "));
        let out = rewrite_or_original(&stub, "Built REST APIs.", &missing()).await;
        assert_eq!(out, "Built REST APIs.");
    }

    #[tokio::test]
    async fn test_no_suggestions_skips_rewriter() {
        let stub = StubRewriter::new(Ok("should not be used"));
        for report in [
            SuggestionReport::no_bullets(),
            SuggestionReport::from_missing(vec![]),
        ] {
            let out = rewrite_or_original(&stub, "Built REST APIs.", &report).await;
            assert_eq!(out, "Built REST APIs.");
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prompt_includes_resume_and_suggestions() {
        let prompt = build_rewrite_prompt("Jane Doe\nRust", &missing().to_string());
        assert!(prompt.contains("Resume Text:\nJane Doe\nRust"));
        assert!(prompt.contains("• Write unit tests"));
        assert!(prompt.ends_with("Refined Resume:"));
    }
}
