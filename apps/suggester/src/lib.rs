//! Resume suggestion engine: finds job requirements a resume does not cover,
//! using semantic similarity instead of exact keyword matching.

pub mod config;
pub mod documents;
pub mod embedding;
pub mod errors;
pub mod llm_client;
pub mod retry;
pub mod rewrite;
pub mod suggestion;

pub use embedding::{EmbeddingError, EmbeddingProvider};
pub use errors::SuggestError;
pub use suggestion::report::{ReportOutcome, SuggestionReport};
pub use suggestion::{Analysis, Suggester, Thresholds};
