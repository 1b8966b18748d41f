//! YouTube Data API v3 wire shapes for `commentThreads.list` and
//! `comments.list`. Only the fields the pipeline consumes are modeled.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommentThreadsPage {
    #[serde(default)]
    pub items: Vec<ApiCommentThread>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommentThread {
    pub snippet: ApiThreadSnippet,
    /// Replies inlined by the API; may be a partial page when the thread has
    /// more replies than fit, signalled by `total_reply_count`.
    pub replies: Option<ApiReplies>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiThreadSnippet {
    pub top_level_comment: ApiComment,
    #[serde(default)]
    pub total_reply_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReplies {
    #[serde(default)]
    pub comments: Vec<ApiComment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommentsPage {
    #[serde(default)]
    pub items: Vec<ApiComment>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiComment {
    pub id: String,
    pub snippet: ApiCommentSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCommentSnippet {
    pub text_display: String,
    pub author_display_name: String,
    #[serde(default)]
    pub like_count: u64,
    pub published_at: String, // RFC 3339
    pub parent_id: Option<String>,
}
