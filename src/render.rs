use crate::models::AnalysisReport;
use crate::normalize::normalize;
use crate::themes::theme_title;

/// Themes listed in the markdown report; the JSON artifact carries all.
const LISTED_THEMES: usize = 10;

pub fn render_report_markdown(report: &AnalysisReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Comment Analysis — {}\n\n", report.video_id));
    md.push_str(&format!("Analyzed {} comments.\n\n", report.comment_count));

    md.push_str("## Top Discussion Themes\n");
    let mut listed = 0;
    for theme in report.clear_themes().take(LISTED_THEMES) {
        let rep = &theme.example_comments[0];
        md.push_str(&format!(
            "- **{}** — {} comments, {} likes ({} positive / {} neutral / {} negative)\n",
            theme_title(&normalize(&rep.text)),
            theme.size,
            theme.like_count,
            theme.aggregate_sentiment.positive,
            theme.aggregate_sentiment.neutral,
            theme.aggregate_sentiment.negative,
        ));
        listed += 1;
    }
    if listed == 0 {
        md.push_str("No clear themes emerged from the comments.\n");
    }
    md.push('\n');

    md.push_str("## Sentiment Distribution\n");
    let d = &report.sentiment_distribution;
    md.push_str(&format!(
        "- Positive: {}\n- Neutral: {}\n- Negative: {}\n\n",
        d.positive, d.neutral, d.negative
    ));

    md.push_str("## Frequent Keywords\n");
    if report.keywords.is_empty() {
        md.push_str("No significant keywords found.\n");
    } else {
        md.push_str("| Rank | Keyword | Score |\n|---:|---|---:|\n");
        for k in &report.keywords {
            md.push_str(&format!("| {} | {} | {:.4} |\n", k.rank, k.phrase, k.score));
        }
    }
    md.push('\n');

    md.push_str("## FAQ\n");
    if report.faq.is_empty() {
        md.push_str("No themes found to build an FAQ from.\n");
    } else {
        for entry in &report.faq {
            md.push_str(&format!("### {}\n", entry.question));
            md.push_str(&format!(
                "> {} — *{}* ({} likes)\n\n",
                normalize(&entry.answer_comment.text),
                entry.answer_comment.author,
                entry.answer_comment.like_count
            ));
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Comment, FaqEntry, Keyword, SentimentBreakdown, ThemeSummary,
    };
    use chrono::{TimeZone, Utc};

    fn sample_report() -> AnalysisReport {
        let rep = Comment {
            id: "c1".to_string(),
            video_id: "vid".to_string(),
            text: "When does it ship?".to_string(),
            author: "alice".to_string(),
            like_count: 12,
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            parent_id: None,
        };
        AnalysisReport {
            video_id: "vid".to_string(),
            comment_count: 42,
            themes: vec![ThemeSummary {
                cluster_id: 0,
                size: 30,
                like_count: 55,
                representative_comment_id: "c1".to_string(),
                aggregate_sentiment: SentimentBreakdown {
                    positive: 10,
                    neutral: 15,
                    negative: 5,
                },
                top_keywords: vec![],
                example_comments: vec![rep.clone()],
            }],
            sentiment_distribution: SentimentBreakdown {
                positive: 12,
                neutral: 20,
                negative: 10,
            },
            keywords: vec![Keyword {
                phrase: "shipping".to_string(),
                score: 0.21,
                rank: 1,
            }],
            faq: vec![FaqEntry {
                question: "When does it ship?".to_string(),
                answer_comment: rep,
            }],
        }
    }

    #[test]
    fn renders_every_section() {
        let md = render_report_markdown(&sample_report());
        assert!(md.contains("Analyzed 42 comments."));
        assert!(md.contains("## Top Discussion Themes"));
        assert!(md.contains("30 comments, 55 likes"));
        assert!(md.contains("## Sentiment Distribution"));
        assert!(md.contains("| 1 | shipping | 0.2100 |"));
        assert!(md.contains("### When does it ship?"));
    }

    #[test]
    fn empty_report_renders_placeholders() {
        let md = render_report_markdown(&AnalysisReport::empty("vid", 0));
        assert!(md.contains("Analyzed 0 comments."));
        assert!(md.contains("No clear themes emerged"));
        assert!(md.contains("No significant keywords found."));
        assert!(md.contains("No themes found to build an FAQ from."));
    }
}
