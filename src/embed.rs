use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::error::{AnalysisError, Result};

/// Maps each text to a fixed-length dense vector. Order-preserving: one
/// vector per input text, same dimension across all calls in a process.
/// Implementations return unit-length vectors so cosine distance downstream
/// is just `1 - dot`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-compatible `/embeddings` endpoint wrapper (a local
/// sentence-transformers server speaks the same protocol).
pub struct HttpEmbeddingProvider {
    client: Client,
    config: EmbeddingConfig,
}

impl HttpEmbeddingProvider {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AnalysisError::Embedding(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let start = std::time::Instant::now();
        let url = format!("{}/embeddings", self.config.api_base);
        debug!(
            "Embedding request - model={}, texts={}",
            self.config.model,
            texts.len()
        );

        let resp = self
            .client
            .post(&url)
            .json(&json!({ "model": self.config.model, "input": texts }))
            .send()
            .await
            .map_err(|e| AnalysisError::Embedding(e.to_string()))?
            .error_for_status()
            .map_err(|e| AnalysisError::Embedding(e.to_string()))?;

        let mut body: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| AnalysisError::Embedding(format!("decoding response: {e}")))?;

        if body.data.len() != texts.len() {
            return Err(AnalysisError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                body.data.len()
            )));
        }
        body.data.sort_by_key(|item| item.index);

        let dim = body.data[0].embedding.len();
        let mut vectors = Vec::with_capacity(body.data.len());
        for item in body.data {
            if item.embedding.len() != dim {
                return Err(AnalysisError::Embedding(format!(
                    "inconsistent vector length: {} vs {}",
                    item.embedding.len(),
                    dim
                )));
            }
            vectors.push(unit_normalize(item.embedding));
        }

        info!(
            "Embedding completed - duration={:.2}s, vectors={}, dim={}",
            start.elapsed().as_secs_f32(),
            vectors.len(),
            dim
        );
        Ok(vectors)
    }
}

/// Scale to unit L2 norm; an all-zero vector stays all-zero.
pub fn unit_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}
