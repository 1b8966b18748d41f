use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::KeywordConfig;
use crate::keywords;
use crate::models::{
    ClusterId, Comment, FaqEntry, NormalizedText, SentimentBreakdown, SentimentResult,
    ThemeSummary, NOISE,
};
use crate::normalize::normalize;

/// Example comments carried per theme.
const EXAMPLE_CAP: usize = 3;
/// Per-theme keyword count.
const THEME_KEYWORD_COUNT: usize = 5;
/// Words of the representative comment used for titles and wrapped questions.
const TITLE_WORDS: usize = 5;
const QUESTION_WORDS: usize = 12;

/// Order clusters into ranked `ThemeSummary` values.
///
/// Ranking key: primary = member-comment count (every original comment
/// mapped through its normalized text), secondary = summed like count
/// descending, final tie-break = representative comment id ascending. The
/// last key is content-derived rather than cluster-id based so the ranked
/// order survives permutations of the input comments (cluster ids do not:
/// they depend on first-seen order). The noise pseudo-theme, when present,
/// always ranks last.
///
/// `groups[i]` carries the texts clustered under `labels[i]`; both come from
/// the same analysis run, so the two slices are equal length.
pub fn rank_themes(
    groups: &[NormalizedText],
    labels: &[ClusterId],
    sentiments: &[SentimentResult],
    comments: &[Comment],
    keyword_config: &KeywordConfig,
) -> Vec<ThemeSummary> {
    debug_assert_eq!(groups.len(), labels.len());

    let comment_by_id: HashMap<&str, &Comment> =
        comments.iter().map(|c| (c.id.as_str(), c)).collect();
    let label_by_id: HashMap<&str, _> = sentiments
        .iter()
        .map(|s| (s.comment_id.as_str(), s.label))
        .collect();

    let mut members: BTreeMap<ClusterId, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        members.entry(label).or_default().push(idx);
    }

    let mut summaries: Vec<ThemeSummary> = members
        .into_iter()
        .map(|(cluster_id, group_idxs)| {
            let mut member_comments: Vec<&Comment> = group_idxs
                .iter()
                .flat_map(|&g| groups[g].comment_ids.iter())
                .filter_map(|id| comment_by_id.get(id.as_str()).copied())
                .collect();
            // Representative = most liked, tie earliest published, tie
            // smallest id. The same order caps the example list, so
            // example_comments[0] is always the representative.
            member_comments.sort_by(|a, b| {
                b.like_count
                    .cmp(&a.like_count)
                    .then_with(|| a.published_at.cmp(&b.published_at))
                    .then_with(|| a.id.cmp(&b.id))
            });

            let mut aggregate = SentimentBreakdown::default();
            for c in &member_comments {
                if let Some(&label) = label_by_id.get(c.id.as_str()) {
                    aggregate.add(label);
                }
            }

            let member_texts: Vec<String> = group_idxs
                .iter()
                .map(|&g| groups[g].display.clone())
                .collect();
            let top_keywords =
                keywords::extract(&member_texts, THEME_KEYWORD_COUNT, keyword_config);

            ThemeSummary {
                cluster_id,
                size: member_comments.len(),
                like_count: member_comments.iter().map(|c| c.like_count).sum(),
                representative_comment_id: member_comments
                    .first()
                    .map(|c| c.id.clone())
                    .unwrap_or_default(),
                aggregate_sentiment: aggregate,
                top_keywords,
                example_comments: member_comments
                    .into_iter()
                    .take(EXAMPLE_CAP)
                    .cloned()
                    .collect(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.is_noise()
            .cmp(&b.is_noise())
            .then_with(|| b.size.cmp(&a.size))
            .then_with(|| b.like_count.cmp(&a.like_count))
            .then_with(|| {
                a.representative_comment_id
                    .cmp(&b.representative_comment_id)
            })
    });

    let clear = summaries.iter().filter(|t| !t.is_noise()).count();
    if clear == 0 {
        debug!("No clear themes - every text landed in noise");
    }
    summaries
}

/// One FAQ entry per non-noise theme, in rank order. The question is a
/// deterministic textual transform of the representative comment, never a
/// generative one.
pub fn build_faq(themes: &[ThemeSummary]) -> Vec<FaqEntry> {
    themes
        .iter()
        .filter(|t| !t.is_noise())
        .filter_map(|t| t.example_comments.first())
        .map(|rep| FaqEntry {
            question: as_question(&normalize(&rep.text)),
            answer_comment: rep.clone(),
        })
        .collect()
}

/// An already interrogative comment is used verbatim; anything else is
/// wrapped as a "What about ...?" question over its leading words.
pub fn as_question(text: &str) -> String {
    if text.contains('?') {
        return text.to_string();
    }
    format!("What about \"{}\"?", leading_words(text, QUESTION_WORDS))
}

/// Short display title for a theme: first words of its representative text.
pub fn theme_title(text: &str) -> String {
    leading_words(text, TITLE_WORDS)
}

fn leading_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        words.join(" ")
    } else {
        format!("{}…", words[..max_words].join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use chrono::{TimeZone, Utc};

    fn comment(id: &str, text: &str, likes: u64, minute: u32) -> Comment {
        Comment {
            id: id.to_string(),
            video_id: "vid".to_string(),
            text: text.to_string(),
            author: "a".to_string(),
            like_count: likes,
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
            parent_id: None,
        }
    }

    fn group(display: &str, ids: &[&str]) -> NormalizedText {
        NormalizedText {
            display: display.to_string(),
            key: display.to_lowercase(),
            comment_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn neutral(ids: &[&str]) -> Vec<SentimentResult> {
        ids.iter()
            .map(|id| SentimentResult {
                comment_id: id.to_string(),
                compound: 0.0,
                label: SentimentLabel::Neutral,
            })
            .collect()
    }

    #[test]
    fn ranks_by_member_count_through_dedup_then_likes() {
        // Cluster 0: one text carrying three comments with no likes.
        // Cluster 1: two texts carrying three comments with likes.
        // Cluster 2: one comment. Noise: one comment.
        let groups = vec![
            group("when does it ship", &["a1", "a2", "a3"]),
            group("price is high", &["b1", "b2"]),
            group("too expensive", &["b3"]),
            group("lone remark", &["c1"]),
            group("odd one out", &["n1"]),
        ];
        let labels = vec![0, 1, 1, 2, NOISE];
        let comments = vec![
            comment("a1", "when does it ship", 0, 0),
            comment("a2", "when does it ship", 0, 1),
            comment("a3", "when does it ship", 0, 2),
            comment("b1", "price is high", 5, 0),
            comment("b2", "price is high", 2, 1),
            comment("b3", "too expensive", 1, 2),
            comment("c1", "lone remark", 100, 0),
            comment("n1", "odd one out", 50, 0),
        ];
        let sentiments = neutral(&["a1", "a2", "a3", "b1", "b2", "b3", "c1", "n1"]);

        let themes = rank_themes(
            &groups,
            &labels,
            &sentiments,
            &comments,
            &KeywordConfig::default(),
        );

        assert_eq!(themes.len(), 4);
        // Both clusters 0 and 1 hold three comments; cluster 1 wins the tie
        // on likes (8 vs 0).
        assert_eq!(themes[0].cluster_id, 1);
        assert_eq!(themes[0].size, 3);
        assert_eq!(themes[0].like_count, 8);
        assert_eq!(themes[1].cluster_id, 0);
        assert_eq!(themes[2].cluster_id, 2);
        // Noise is last despite out-liking cluster 2's lone comment.
        assert!(themes[3].is_noise());
    }

    #[test]
    fn representative_is_most_liked_then_earliest_then_smallest_id() {
        let groups = vec![group("same text", &["x", "y", "z"])];
        let labels = vec![0];
        let comments = vec![
            comment("z", "same text", 7, 5),
            comment("y", "same text", 7, 1),
            comment("x", "same text", 3, 0),
        ];
        let sentiments = neutral(&["x", "y", "z"]);

        let themes = rank_themes(
            &groups,
            &labels,
            &sentiments,
            &comments,
            &KeywordConfig::default(),
        );
        // "y" and "z" tie on likes; "y" published earlier.
        assert_eq!(themes[0].representative_comment_id, "y");
        assert_eq!(themes[0].example_comments[0].id, "y");
    }

    #[test]
    fn aggregates_sentiment_per_original_comment() {
        let groups = vec![group("love it", &["p1", "p2"]), group("hate it", &["n1"])];
        let labels = vec![0, 0];
        let comments = vec![
            comment("p1", "love it", 0, 0),
            comment("p2", "love it", 0, 1),
            comment("n1", "hate it", 0, 2),
        ];
        let sentiments = vec![
            SentimentResult {
                comment_id: "p1".into(),
                compound: 0.6,
                label: SentimentLabel::Positive,
            },
            SentimentResult {
                comment_id: "p2".into(),
                compound: 0.6,
                label: SentimentLabel::Positive,
            },
            SentimentResult {
                comment_id: "n1".into(),
                compound: -0.5,
                label: SentimentLabel::Negative,
            },
        ];

        let themes = rank_themes(
            &groups,
            &labels,
            &sentiments,
            &comments,
            &KeywordConfig::default(),
        );
        assert_eq!(themes[0].aggregate_sentiment.positive, 2);
        assert_eq!(themes[0].aggregate_sentiment.negative, 1);
        assert_eq!(
            themes[0].aggregate_sentiment.dominant(),
            SentimentLabel::Positive
        );
        assert!(themes[0].top_keywords.len() <= 5);
    }

    #[test]
    fn faq_skips_noise_and_transforms_questions() {
        let groups = vec![
            group("When does it ship?", &["q1"]),
            group("the battery drains fast", &["s1"]),
            group("stray", &["n1"]),
        ];
        let labels = vec![0, 1, NOISE];
        let comments = vec![
            comment("q1", "When does it ship?", 2, 0),
            comment("s1", "the battery drains fast", 1, 0),
            comment("n1", "stray", 9, 0),
        ];
        let sentiments = neutral(&["q1", "s1", "n1"]);

        let themes = rank_themes(
            &groups,
            &labels,
            &sentiments,
            &comments,
            &KeywordConfig::default(),
        );
        let faq = build_faq(&themes);

        assert_eq!(faq.len(), 2);
        // Interrogative representative used verbatim.
        assert_eq!(faq[0].question, "When does it ship?");
        assert_eq!(faq[0].answer_comment.id, "q1");
        // Statement wrapped deterministically.
        assert_eq!(faq[1].question, "What about \"the battery drains fast\"?");
    }

    #[test]
    fn question_wrap_truncates_long_statements() {
        let text = "one two three four five six seven eight nine ten eleven twelve thirteen";
        let q = as_question(text);
        assert_eq!(
            q,
            "What about \"one two three four five six seven eight nine ten eleven twelve…\"?"
        );
        assert_eq!(theme_title(text), "one two three four five…");
    }
}
