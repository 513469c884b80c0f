use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use suggester::config::{Config, EmbeddingBackend};
use suggester::documents::{DocumentRenderer, PdfTextExtractor, PlainTextRenderer, TextExtractor};
use suggester::embedding::{EmbeddingProvider, HashingEmbedder, OpenAiEmbedder};
use suggester::llm_client::LlmClient;
use suggester::rewrite::{rewrite_or_original, LlmRewriter};
use suggester::suggestion::extractor::BulletPolicy;
use suggester::{Suggester, Thresholds};

#[derive(Parser, Debug)]
#[command(
    name = "suggester",
    version,
    about = "Suggest job requirements missing from a resume"
)]
struct Cli {
    /// Resume file: PDF (by extension) or plain text
    #[arg(long)]
    resume: PathBuf,

    /// Job description as plain text
    #[arg(long)]
    job: PathBuf,

    /// Minimum similarity for a requirement to count as covered (overrides COVER_THRESHOLD)
    #[arg(long)]
    cover_threshold: Option<f32>,

    /// Minimum similarity for two requirements to be merged (overrides CLUSTER_THRESHOLD)
    #[arg(long)]
    cluster_threshold: Option<f32>,

    /// Print the full analysis as JSON instead of the text report
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Rewrite the resume with the suggestions (needs ANTHROPIC_API_KEY)
    #[arg(long, default_value_t = false)]
    rewrite: bool,

    /// Where to write the rewritten resume
    #[arg(long, default_value = "updated_resume.txt")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting suggester v{}", env!("CARGO_PKG_VERSION"));

    // Built once; shared read-only by every pipeline run.
    let provider = build_embedding_provider(&config.embedding)?;
    info!("Embedding provider initialized ({})", provider.name());

    let policy = match &config.bullet_policy_path {
        Some(path) => BulletPolicy::from_path(path)?,
        None => BulletPolicy::default(),
    };
    let suggester = Suggester::new(provider, policy);

    let thresholds = Thresholds {
        cover: cli.cover_threshold.unwrap_or(config.thresholds.cover),
        cluster: cli.cluster_threshold.unwrap_or(config.thresholds.cluster),
    };

    let resume_text = load_resume(&cli.resume)?;
    let job_description = std::fs::read_to_string(&cli.job)
        .with_context(|| format!("Failed to read job description {}", cli.job.display()))?;

    let analysis = suggester
        .analyze(&resume_text, &job_description, &thresholds)
        .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", analysis.report);
    }

    if cli.rewrite {
        let Some(api_key) = config.anthropic_api_key.clone() else {
            bail!("--rewrite requires ANTHROPIC_API_KEY to be set");
        };
        let llm = LlmClient::new(api_key, config.rewrite_model.clone())?;
        info!("LLM client initialized (model: {})", llm.model());

        let rewriter = LlmRewriter(llm);
        let updated = rewrite_or_original(&rewriter, &resume_text, &analysis.report).await;

        let renderer = PlainTextRenderer;
        let rendered = renderer.render(&updated)?;
        let output = cli.output.with_extension(renderer.extension());
        std::fs::write(&output, &rendered)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Wrote updated resume to {}", output.display());
    }

    Ok(())
}

fn build_embedding_provider(backend: &EmbeddingBackend) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match backend {
        EmbeddingBackend::OpenAi(settings) => {
            let embedder = OpenAiEmbedder::new(settings.clone())
                .context("Failed to build OpenAI embeddings client")?;
            info!("Embedding model: {}", embedder.model());
            Arc::new(embedder)
        }
        EmbeddingBackend::Hashing { dimensions } => Arc::new(HashingEmbedder::new(*dimensions)),
    };
    Ok(provider)
}

fn load_resume(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = PdfTextExtractor.extract(&bytes)?;
        info!("Extracted resume text from {}", path.display());
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resume {}", path.display()))
    }
}
