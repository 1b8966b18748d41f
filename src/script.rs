use crate::error::{AnalysisError, Result};
use crate::models::{AnalysisReport, SentimentLabel, ThemeSummary};
use crate::normalize::normalize;
use crate::themes::theme_title;

/// Turn the top ranked themes into a fixed-structure 60-second script.
///
/// Pure template filling over the analysis result: identical input produces
/// byte-identical output. Fails with `InsufficientThemes` only when zero
/// non-noise themes exist; the caller decides the fallback.
pub fn generate_script(report: &AnalysisReport, limit: usize) -> Result<String> {
    if report.clear_themes().next().is_none() {
        return Err(AnalysisError::InsufficientThemes);
    }
    // A limit of zero keeps the hook and call to action with no body.
    let top: Vec<&ThemeSummary> = report.clear_themes().take(limit).collect();

    let mut out = String::new();
    out.push_str("# 60-Second Comment FAQ Script\n\n");

    out.push_str("**Hook (0-5s):**\n");
    out.push_str(&format!(
        "Host: \"I went through all {} comments on this video, and a few things kept coming up. Here's what everyone is really talking about.\"\n\n",
        report.comment_count
    ));

    let segments = top.len();
    for (i, theme) in top.iter().enumerate() {
        let (start, end) = segment_window(i, segments);
        let rep = &theme.example_comments[0];
        out.push_str(&format!("**Point {} ({start}-{end}s):**\n", i + 1));
        out.push_str(&format!(
            "Host: \"{} **{}**. The mood here is {}, and the word that keeps coming back is **{}**.\"\n",
            intro_phrase(i, segments),
            theme_title(&normalize(&rep.text)),
            mood_phrase(theme.aggregate_sentiment.dominant()),
            theme
                .top_keywords
                .first()
                .map(|k| k.phrase.as_str())
                .unwrap_or("this topic"),
        ));
        out.push_str("*(Show the representative comment on screen)*\n");
        out.push_str(&format!("> {}\n", normalize(&rep.text)));
        out.push_str("Host: \"Here's the short answer: [your response to this theme].\"\n\n");
    }

    out.push_str("**Call to Action (50-60s):**\n");
    out.push_str(
        "Host: \"Did I miss your question? Drop it in the comments and I'll cover it next time. And if this cleared something up, a like and a subscribe go a long way.\"\n",
    );
    Ok(out)
}

/// Evenly split the 5s-50s body across the segments.
fn segment_window(index: usize, segments: usize) -> (usize, usize) {
    const BODY_START: usize = 5;
    const BODY_END: usize = 50;
    let span = BODY_END - BODY_START;
    let start = BODY_START + index * span / segments;
    let end = BODY_START + (index + 1) * span / segments;
    (start, end)
}

fn intro_phrase(index: usize, segments: usize) -> &'static str {
    if index == 0 {
        "First up:"
    } else if index + 1 == segments {
        "And finally:"
    } else {
        "Next:"
    }
}

fn mood_phrase(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "clearly positive",
        SentimentLabel::Neutral => "mixed",
        SentimentLabel::Negative => "frustrated",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comment, Keyword, SentimentBreakdown, NOISE};
    use chrono::{TimeZone, Utc};

    fn theme(cluster_id: i64, text: &str, keyword: &str, positive: usize) -> ThemeSummary {
        let rep = Comment {
            id: format!("rep-{cluster_id}"),
            video_id: "vid".to_string(),
            text: text.to_string(),
            author: "a".to_string(),
            like_count: 3,
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            parent_id: None,
        };
        ThemeSummary {
            cluster_id,
            size: 10,
            like_count: 3,
            representative_comment_id: rep.id.clone(),
            aggregate_sentiment: SentimentBreakdown {
                positive,
                neutral: 1,
                negative: 0,
            },
            top_keywords: vec![Keyword {
                phrase: keyword.to_string(),
                score: 0.1,
                rank: 1,
            }],
            example_comments: vec![rep],
        }
    }

    fn report(themes: Vec<ThemeSummary>) -> AnalysisReport {
        AnalysisReport {
            themes,
            ..AnalysisReport::empty("vid", 120)
        }
    }

    #[test]
    fn output_is_byte_identical_for_identical_input() {
        let r = report(vec![
            theme(0, "when does it ship", "shipping", 5),
            theme(1, "price is too high", "price", 0),
        ]);
        assert_eq!(
            generate_script(&r, 3).unwrap(),
            generate_script(&r, 3).unwrap()
        );
    }

    #[test]
    fn script_has_the_fixed_structure() {
        let r = report(vec![
            theme(0, "when does it ship", "shipping", 5),
            theme(1, "price is too high", "price", 0),
            theme(2, "the battery drains fast", "battery", 0),
        ]);
        let script = generate_script(&r, 3).unwrap();
        assert!(script.contains("**Hook (0-5s):**"));
        assert!(script.contains("all 120 comments"));
        assert!(script.contains("**Point 1 (5-20s):**"));
        assert!(script.contains("**Point 2 (20-35s):**"));
        assert!(script.contains("**Point 3 (35-50s):**"));
        assert!(script.contains("**Call to Action (50-60s):**"));
        assert!(script.contains("First up:"));
        assert!(script.contains("And finally:"));
        assert!(script.contains("**shipping**"));
        assert!(script.contains("> when does it ship"));
    }

    #[test]
    fn respects_theme_limit_and_rank_order() {
        let r = report(vec![
            theme(0, "alpha theme", "alpha", 1),
            theme(1, "beta theme", "beta", 1),
            theme(2, "gamma theme", "gamma", 1),
        ]);
        let script = generate_script(&r, 2).unwrap();
        assert!(script.contains("alpha"));
        assert!(script.contains("beta"));
        assert!(!script.contains("gamma"));
    }

    #[test]
    fn zero_limit_keeps_hook_and_call_to_action_only() {
        let r = report(vec![theme(0, "alpha theme", "alpha", 1)]);
        let script = generate_script(&r, 0).unwrap();
        assert!(script.contains("**Hook (0-5s):**"));
        assert!(script.contains("**Call to Action (50-60s):**"));
        assert!(!script.contains("**Point 1"));
    }

    #[test]
    fn noise_only_report_is_insufficient() {
        let r = report(vec![theme(NOISE, "stray", "stray", 0)]);
        assert!(matches!(
            generate_script(&r, 3),
            Err(AnalysisError::InsufficientThemes)
        ));
    }

    #[test]
    fn empty_report_is_insufficient() {
        let r = AnalysisReport::empty("vid", 0);
        assert!(matches!(
            generate_script(&r, 3),
            Err(AnalysisError::InsufficientThemes)
        ));
    }
}
