use async_trait::async_trait;
use chrono::DateTime;
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::api_types::{ApiComment, ApiCommentsPage, ApiCommentThreadsPage};
use crate::error::{AnalysisError, Result};
use crate::models::Comment;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const PAGE_SIZE: u32 = 100;

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid id pattern"));

/// Extract a video id from a user-supplied locator: a full watch URL
/// (`https://<host>/watch?v=<ID>`), a `youtu.be/<ID>` or `/shorts/<ID>` link,
/// or a bare 11-character id. Fails before any network call.
pub fn parse_video_locator(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if VIDEO_ID_RE.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    let candidate = if let Some((_, rest)) = trimmed.split_once("v=") {
        rest.split(['&', '#']).next().unwrap_or_default()
    } else if let Some((_, rest)) = trimmed.split_once("youtu.be/") {
        rest.split(['?', '&', '#', '/']).next().unwrap_or_default()
    } else if let Some((_, rest)) = trimmed.split_once("/shorts/") {
        rest.split(['?', '&', '#', '/']).next().unwrap_or_default()
    } else {
        ""
    };

    if VIDEO_ID_RE.is_match(candidate) {
        Ok(candidate.to_string())
    } else {
        Err(AnalysisError::InvalidLocator(trimmed.to_string()))
    }
}

/// Injected comment data source. Implementations return every top-level
/// comment and every reply for the video, fully paginated. A zero-length
/// result is valid (comments disabled), not an error.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_all(&self, video_id: &str) -> Result<Vec<Comment>>;
}

/// Credentials and endpoint for the YouTube Data API, passed in explicitly
/// so tests can point the adapter elsewhere.
#[derive(Debug, Clone)]
pub struct YouTubeSourceConfig {
    pub api_key: String,
    pub api_base: String,
}

impl YouTubeSourceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

pub struct YouTubeSource {
    client: Client,
    config: YouTubeSourceConfig,
}

impl YouTubeSource {
    pub fn new(config: YouTubeSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AnalysisError::SourceUnavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        video_id: &str,
    ) -> Result<T> {
        let url = format!("{}/{}", self.config.api_base, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AnalysisError::SourceUnavailable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AnalysisError::VideoNotFound(video_id.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // 403 with commentsDisabled means the video exists but disallows
            // listing; auth and quota failures are transient to the caller.
            if status == StatusCode::FORBIDDEN && body.contains("commentsDisabled") {
                return Err(AnalysisError::VideoNotFound(video_id.to_string()));
            }
            warn!("Source returned {} for {} - body={}", status, path, body);
            return Err(AnalysisError::SourceUnavailable(format!(
                "{status} from {path}"
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| AnalysisError::SourceUnavailable(format!("decoding {path}: {e}")))
    }

    /// Paginate `comments.list` for one thread's replies when the inline set
    /// on the thread was incomplete.
    async fn fetch_replies(&self, video_id: &str, parent_id: &str) -> Result<Vec<Comment>> {
        let mut replies = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let max_results = PAGE_SIZE.to_string();
            let mut query = vec![
                ("part", "snippet"),
                ("parentId", parent_id),
                ("maxResults", max_results.as_str()),
                ("textFormat", "plainText"),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }
            let page: ApiCommentsPage = self.get_page("comments", &query, video_id).await?;
            for item in &page.items {
                replies.push(map_comment(item, video_id, Some(parent_id))?);
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(replies)
    }
}

#[async_trait]
impl CommentSource for YouTubeSource {
    async fn fetch_all(&self, video_id: &str) -> Result<Vec<Comment>> {
        let start = std::time::Instant::now();
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let max_results = PAGE_SIZE.to_string();
            let mut query = vec![
                ("part", "snippet,replies"),
                ("videoId", video_id),
                ("maxResults", max_results.as_str()),
                ("textFormat", "plainText"),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let page: ApiCommentThreadsPage =
                self.get_page("commentThreads", &query, video_id).await?;
            pages += 1;
            debug!(
                "Fetched comment thread page {} - threads={}",
                pages,
                page.items.len()
            );

            for thread in page.items {
                let top = map_comment(&thread.snippet.top_level_comment, video_id, None)?;
                let top_id = top.id.clone();
                comments.push(top);

                let inline = thread.replies.map(|r| r.comments).unwrap_or_default();
                if (inline.len() as u64) < thread.snippet.total_reply_count {
                    // Inline replies were truncated; pull the full set.
                    comments.extend(self.fetch_replies(video_id, &top_id).await?);
                } else {
                    for reply in &inline {
                        comments.push(map_comment(reply, video_id, Some(&top_id))?);
                    }
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(
            "Comment fetch completed - video={}, duration={:.2}s, pages={}, comments={}",
            video_id,
            start.elapsed().as_secs_f32(),
            pages,
            comments.len()
        );
        Ok(comments)
    }
}

fn map_comment(api: &ApiComment, video_id: &str, parent_id: Option<&str>) -> Result<Comment> {
    let published_at = DateTime::parse_from_rfc3339(&api.snippet.published_at)
        .map_err(|e| {
            AnalysisError::SourceUnavailable(format!(
                "bad publishedAt {:?} on comment {}: {e}",
                api.snippet.published_at, api.id
            ))
        })?
        .to_utc();
    Ok(Comment {
        id: api.id.clone(),
        video_id: video_id.to_string(),
        text: api.snippet.text_display.clone(),
        author: api.snippet.author_display_name.clone(),
        like_count: api.snippet.like_count,
        published_at,
        parent_id: api
            .snippet
            .parent_id
            .clone()
            .or_else(|| parent_id.map(str::to_string)),
    })
}
