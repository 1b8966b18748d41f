use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cluster label assigned by the theme clusterer. `NOISE` marks texts that
/// belong to no dense region. Ids are stable only within a single analysis
/// run, never across runs or parameter changes.
pub type ClusterId = i64;
pub const NOISE: ClusterId = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub text: String,
    pub author: String,
    pub like_count: u64,
    pub published_at: DateTime<Utc>,
    /// Set for replies, pointing at the top-level comment.
    pub parent_id: Option<String>,
}

/// One group of comments whose cleaned texts are exactly equal
/// (case-insensitive). `display` keeps the first-seen casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedText {
    pub display: String,
    pub key: String,
    /// Every original comment id that produced this text, first-seen order.
    pub comment_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

/// Polarity of a single original comment. Computed per comment, not per
/// deduplicated text, so identical phrases from different authors each carry
/// their own signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub comment_id: String,
    pub compound: f64,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn add(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Label with the highest count. Ties resolve Positive > Neutral >
    /// Negative.
    pub fn dominant(&self) -> SentimentLabel {
        if self.positive >= self.neutral && self.positive >= self.negative {
            SentimentLabel::Positive
        } else if self.neutral >= self.negative {
            SentimentLabel::Neutral
        } else {
            SentimentLabel::Negative
        }
    }
}

/// Ranked keyphrase. Lower `score` means more relevant (the extractor keeps
/// the convention of the positional scoring formula it uses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub phrase: String,
    pub score: f64,
    pub rank: usize,
}

/// One discovered discussion theme, recomputed in full on every analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub cluster_id: ClusterId,
    /// Count of member comments, counting every original comment mapped
    /// through its normalized text (not just unique texts).
    pub size: usize,
    /// Summed like count across member comments; ranking tie-break.
    pub like_count: u64,
    pub representative_comment_id: String,
    pub aggregate_sentiment: SentimentBreakdown,
    pub top_keywords: Vec<Keyword>,
    /// Capped, ordered by like count then earliest publication; the first
    /// entry is always the representative comment.
    pub example_comments: Vec<Comment>,
}

impl ThemeSummary {
    pub fn is_noise(&self) -> bool {
        self.cluster_id == NOISE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer_comment: Comment,
}

/// Full result of one `analyze` invocation, consumed by the renderer and the
/// script generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub video_id: String,
    pub comment_count: usize,
    /// Ranked; the noise pseudo-theme, when present, is always last.
    pub themes: Vec<ThemeSummary>,
    pub sentiment_distribution: SentimentBreakdown,
    pub keywords: Vec<Keyword>,
    pub faq: Vec<FaqEntry>,
}

impl AnalysisReport {
    pub fn empty(video_id: &str, comment_count: usize) -> Self {
        Self {
            video_id: video_id.to_string(),
            comment_count,
            themes: Vec::new(),
            sentiment_distribution: SentimentBreakdown::default(),
            keywords: Vec::new(),
            faq: Vec::new(),
        }
    }

    /// Themes that survived density clustering, in rank order.
    pub fn clear_themes(&self) -> impl Iterator<Item = &ThemeSummary> {
        self.themes.iter().filter(|t| !t.is_noise())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_label_prefers_positive_on_tie() {
        let mut b = SentimentBreakdown::default();
        b.add(SentimentLabel::Positive);
        b.add(SentimentLabel::Negative);
        assert_eq!(b.dominant(), SentimentLabel::Positive);
        assert_eq!(b.total(), 2);
    }

    #[test]
    fn dominant_label_counts() {
        let mut b = SentimentBreakdown::default();
        b.add(SentimentLabel::Negative);
        b.add(SentimentLabel::Negative);
        b.add(SentimentLabel::Neutral);
        assert_eq!(b.dominant(), SentimentLabel::Negative);
    }
}
