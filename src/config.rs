use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// TOML-backed configuration with documented defaults for every knob.
/// Secrets (the YouTube API key) stay in env vars and are passed to the
/// source adapter explicitly, never read from global state inside the
/// pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub embedding: EmbeddingConfig,
    pub clustering: ClusteringConfig,
    pub sentiment: SentimentConfig,
    pub keywords: KeywordConfig,
    pub cache: CacheConfig,
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// OpenAI-compatible embeddings endpoint base.
    pub api_base: String,
    /// Model identity; cached vectors are only comparable within one model.
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/v1".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Clusters smaller than this dissolve into noise.
    pub min_cluster_size: usize,
    /// Neighbours (incl. self) required for a point to seed a dense region.
    pub min_samples: usize,
    /// Cosine-distance radius on unit vectors.
    pub epsilon: f32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 5,
            min_samples: 2,
            epsilon: 0.35,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentimentConfig {
    /// compound >= this => Positive.
    pub positive_threshold: f64,
    /// compound <= this => Negative.
    pub negative_threshold: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 0.05,
            negative_threshold: -0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordConfig {
    /// Corpus-level keyword count; per-theme extraction uses a fixed top 5.
    pub top_n: usize,
    /// Character-trigram Jaccard similarity at or above which a candidate is
    /// considered redundant with an already selected phrase.
    pub dedup_threshold: f64,
    /// Appended to the built-in English stopword list.
    pub extra_stopwords: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            top_n: 20,
            dedup_threshold: 0.9,
            extra_stopwords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub path: String,
    /// Cached comment sets older than this trigger a re-fetch.
    pub max_age_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: "youtube_comments.db".to_string(),
            max_age_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptConfig {
    /// Number of ranked themes the script covers.
    pub theme_limit: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { theme_limit: 3 }
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
}
