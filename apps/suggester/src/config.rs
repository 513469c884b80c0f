use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::embedding::hashing::DEFAULT_DIMENSIONS;
use crate::embedding::openai::OpenAiSettings;
use crate::llm_client::DEFAULT_MODEL;
use crate::suggestion::Thresholds;

/// Which embedding backend to build at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    OpenAi(OpenAiSettings),
    Hashing { dimensions: usize },
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub embedding: EmbeddingBackend,
    pub thresholds: Thresholds,
    pub bullet_policy_path: Option<PathBuf>,
    /// Enables the rewrite step when set.
    pub anthropic_api_key: Option<String>,
    pub rewrite_model: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let dimensions: Option<usize> = parse_opt(&var, "EMBEDDING_DIMENSIONS")?;

        let backend = var("EMBEDDING_BACKEND").unwrap_or_else(|| "openai".to_string());
        let embedding = match backend.to_lowercase().as_str() {
            "openai" => EmbeddingBackend::OpenAi(OpenAiSettings {
                api_key: var("OPENAI_API_KEY").context(
                    "Required environment variable 'OPENAI_API_KEY' is not set \
                     (or set EMBEDDING_BACKEND=hashing)",
                )?,
                base_url: var("OPENAI_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                model: var("EMBEDDING_MODEL")
                    .unwrap_or_else(|| "text-embedding-3-small".to_string()),
                dimensions,
                timeout: Duration::from_secs(
                    parse_opt(&var, "EMBEDDING_TIMEOUT_SECS")?.unwrap_or(30),
                ),
                max_attempts: parse_opt(&var, "EMBEDDING_MAX_ATTEMPTS")?.unwrap_or(3),
                batch_size: parse_opt(&var, "EMBEDDING_BATCH_SIZE")?.unwrap_or(256),
            }),
            "hashing" => EmbeddingBackend::Hashing {
                dimensions: dimensions.unwrap_or(DEFAULT_DIMENSIONS),
            },
            other => bail!("EMBEDDING_BACKEND must be 'openai' or 'hashing', got '{other}'"),
        };

        let defaults = Thresholds::default();
        Ok(Config {
            embedding,
            thresholds: Thresholds {
                cover: parse_opt(&var, "COVER_THRESHOLD")?.unwrap_or(defaults.cover),
                cluster: parse_opt(&var, "CLUSTER_THRESHOLD")?.unwrap_or(defaults.cluster),
            },
            bullet_policy_path: var("BULLET_POLICY_PATH").map(PathBuf::from),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            rewrite_model: var("REWRITE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_opt<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value '{raw}'"))
        })
        .transpose()
}
