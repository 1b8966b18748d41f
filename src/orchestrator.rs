use chrono::Duration;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::CommentCache;
use crate::cluster::cluster_embeddings;
use crate::config::AnalyzerConfig;
use crate::embed::EmbeddingProvider;
use crate::error::{AnalysisError, Result};
use crate::fetch::CommentSource;
use crate::keywords;
use crate::models::{AnalysisReport, Comment, SentimentBreakdown, SentimentResult};
use crate::normalize::deduplicate;
use crate::sentiment::SentimentScorer;
use crate::themes::{build_faq, rank_themes};

const FETCH_ATTEMPTS: u32 = 3;
const FETCH_BACKOFF_MS: u64 = 500;

/// Whether to serve the cached comment set or hit the source again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    UseCached,
    Refetch,
}

/// Explicit two-state cache-or-fetch rule: a fresh cache entry is used
/// unless the caller forces a refresh; stale or absent entries re-fetch.
pub fn decide_fetch(cache_fresh: bool, force_refresh: bool) -> FetchDecision {
    if cache_fresh && !force_refresh {
        FetchDecision::UseCached
    } else {
        FetchDecision::Refetch
    }
}

/// The analysis pipeline with its injected collaborators: comment source,
/// persistent cache, and embedding provider.
pub struct Pipeline {
    source: Arc<dyn CommentSource>,
    cache: Arc<dyn CommentCache>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: AnalyzerConfig,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn CommentSource>,
        cache: Arc<dyn CommentCache>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            source,
            cache,
            embedder,
            config,
        }
    }

    /// Run the full analysis for one video: ingest (cache or fetch),
    /// normalize and deduplicate, embed, cluster, score sentiment, extract
    /// keywords, rank themes, and assemble the report. Everything derived is
    /// recomputed from scratch; nothing carries over between invocations.
    pub async fn analyze(&self, video_id: &str, force_refresh: bool) -> Result<AnalysisReport> {
        let pipeline_start = std::time::Instant::now();
        info!(
            "Analysis started - video={}, force_refresh={}",
            video_id, force_refresh
        );

        let comments = self.ingest(video_id, force_refresh).await?;
        if comments.is_empty() {
            // Comments disabled is a valid state, not an error.
            info!("No comments available - video={}", video_id);
            return Ok(AnalysisReport::empty(video_id, 0));
        }

        let groups = deduplicate(&comments);
        if groups.is_empty() {
            warn!(
                "Every comment was empty after normalization - video={}, comments={}",
                video_id,
                comments.len()
            );
            return Ok(AnalysisReport::empty(video_id, comments.len()));
        }
        debug!(
            "Deduplication - comments={}, unique_texts={}",
            comments.len(),
            groups.len()
        );

        // Embedding and clustering failures are fatal for the run: ranking
        // and scripting assume a complete assignment.
        let texts: Vec<String> = groups.iter().map(|g| g.display.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            return Err(AnalysisError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        let labels = cluster_embeddings(&vectors, &self.config.clustering);

        // Sentiment is scored per original comment, not per unique text.
        // Comments that normalized to the empty string have no group and are
        // excluded here too, so the distribution only counts surviving ones.
        let surviving: HashSet<&str> = groups
            .iter()
            .flat_map(|g| g.comment_ids.iter().map(String::as_str))
            .collect();
        let scorer = SentimentScorer::new(self.config.sentiment.clone());
        let sentiments: Vec<SentimentResult> = comments
            .iter()
            .filter(|c| surviving.contains(c.id.as_str()))
            .map(|c| scorer.score_comment(c))
            .collect();
        let mut distribution = SentimentBreakdown::default();
        for s in &sentiments {
            distribution.add(s.label);
        }

        let corpus_keywords =
            keywords::extract(&texts, self.config.keywords.top_n, &self.config.keywords);
        let themes = rank_themes(&groups, &labels, &sentiments, &comments, &self.config.keywords);
        let faq = build_faq(&themes);

        info!(
            "Analysis completed - video={}, duration={:.2}s, comments={}, unique_texts={}, themes={}, faq={}",
            video_id,
            pipeline_start.elapsed().as_secs_f32(),
            comments.len(),
            groups.len(),
            themes.iter().filter(|t| !t.is_noise()).count(),
            faq.len()
        );

        Ok(AnalysisReport {
            video_id: video_id.to_string(),
            comment_count: comments.len(),
            themes,
            sentiment_distribution: distribution,
            keywords: corpus_keywords,
            faq,
        })
    }

    /// Cache-or-fetch: fresh hit is served from the cache; otherwise fetch
    /// with bounded retries and store the result before analysis proceeds.
    async fn ingest(&self, video_id: &str, force_refresh: bool) -> Result<Vec<Comment>> {
        let max_age = Duration::hours(self.config.cache.max_age_hours);
        let fresh = self.cache.is_fresh(video_id, max_age)?;

        if decide_fetch(fresh, force_refresh) == FetchDecision::UseCached {
            if let Some(cached) = self.cache.get(video_id)? {
                info!(
                    "Cache hit - video={}, comments={}",
                    video_id,
                    cached.len()
                );
                return Ok(cached);
            }
            // Freshness without rows should not happen; fall through.
            debug!("Fresh cache entry vanished - video={}", video_id);
        }

        let comments = self.fetch_with_retry(video_id).await?;
        self.cache.put(video_id, &comments)?;
        Ok(comments)
    }

    /// Bounded retry with doubling backoff. Only transient source failures
    /// are retried; a missing video fails immediately.
    async fn fetch_with_retry(&self, video_id: &str) -> Result<Vec<Comment>> {
        let mut backoff = std::time::Duration::from_millis(FETCH_BACKOFF_MS);
        let mut last_err: Option<AnalysisError> = None;

        for attempt in 1..=FETCH_ATTEMPTS {
            match self.source.fetch_all(video_id).await {
                Ok(comments) => return Ok(comments),
                Err(e) if e.is_retryable() && attempt < FETCH_ATTEMPTS => {
                    warn!(
                        "Comment fetch failed (attempt {}/{}) - video={}, error={}, retrying in {:?}",
                        attempt, FETCH_ATTEMPTS, video_id, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            AnalysisError::SourceUnavailable("retries exhausted".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cache_is_used_unless_forced() {
        assert_eq!(decide_fetch(true, false), FetchDecision::UseCached);
        assert_eq!(decide_fetch(true, true), FetchDecision::Refetch);
        assert_eq!(decide_fetch(false, false), FetchDecision::Refetch);
        assert_eq!(decide_fetch(false, true), FetchDecision::Refetch);
    }
}
