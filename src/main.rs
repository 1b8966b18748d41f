use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use comment_vibes::cache::SqliteCache;
use comment_vibes::config::{self, AnalyzerConfig};
use comment_vibes::embed::HttpEmbeddingProvider;
use comment_vibes::error::AnalysisError;
use comment_vibes::fetch::{parse_video_locator, YouTubeSource, YouTubeSourceConfig};
use comment_vibes::orchestrator::Pipeline;
use comment_vibes::render::render_report_markdown;
use comment_vibes::script::generate_script;

/// Comment Vibes - YouTube comment theme analyzer and script generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Video locator: a watch URL or a bare video id
    locator: String,

    /// Path to a TOML config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore the cache and re-fetch comments from the source
    #[arg(long)]
    force_refresh: bool,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Also generate the 60-second script alongside the report
    #[arg(long)]
    script: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting comment_vibes");
    let args = Args::parse();

    let cfg = match args.config {
        Some(ref path) => config::load_config(path)?,
        None => AnalyzerConfig::default(),
    };

    let api_key = std::env::var("YOUTUBE_API_KEY")
        .context("YOUTUBE_API_KEY not set; create an API key with the YouTube Data API v3 enabled")?;

    let video_id = parse_video_locator(&args.locator)?;
    info!("Resolved locator - video_id={}", video_id);

    let source = YouTubeSource::new(YouTubeSourceConfig::new(api_key))?;
    let cache = SqliteCache::open(std::path::Path::new(&cfg.cache.path))?;
    let embedder = HttpEmbeddingProvider::new(cfg.embedding.clone())?;

    let theme_limit = cfg.script.theme_limit;
    let pipeline = Pipeline::new(Arc::new(source), Arc::new(cache), Arc::new(embedder), cfg);
    let report = pipeline.analyze(&video_id, args.force_refresh).await?;

    let out_dir = std::path::Path::new(&args.output_dir).join(&video_id);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    std::fs::write(out_dir.join("report.json"), serde_json::to_vec_pretty(&report)?)?;
    std::fs::write(
        out_dir.join("report.md"),
        render_report_markdown(&report).as_bytes(),
    )?;
    info!("Report written - directory={}", out_dir.display());

    if args.script {
        match generate_script(&report, theme_limit) {
            Ok(script) => {
                std::fs::write(out_dir.join("script.md"), script.as_bytes())?;
                info!("Script written - {}", out_dir.join("script.md").display());
            }
            Err(AnalysisError::InsufficientThemes) => {
                warn!("Skipping script - no clear themes to build it from");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        "Done - video={}, comments={}, themes={}",
        video_id,
        report.comment_count,
        report.clear_themes().count()
    );
    Ok(())
}
