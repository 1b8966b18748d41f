use itertools::Itertools;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Comment, NormalizedText};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid url pattern"));

/// Clean a raw comment string: strip URLs and control characters,
/// NFC-normalize, collapse whitespace runs to single spaces, trim.
///
/// Pure and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let without_urls = URL_RE.replace_all(raw, " ");
    let cleaned: String = without_urls.nfc().filter(|c| !c.is_control()).collect();
    cleaned.split_whitespace().join(" ")
}

/// Group comments by normalized-text equality (case-insensitive key),
/// preserving first-seen order among groups. Comments that normalize to the
/// empty string are dropped from all downstream analysis; that is the only
/// way a comment leaves the pipeline.
pub fn deduplicate(comments: &[Comment]) -> Vec<NormalizedText> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, NormalizedText> = HashMap::new();
    let mut dropped = 0usize;

    for comment in comments {
        let display = normalize(&comment.text);
        if display.is_empty() {
            dropped += 1;
            debug!("Comment empty after normalization - id={}", comment.id);
            continue;
        }
        let key = display.to_lowercase();
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key.clone());
                NormalizedText {
                    display,
                    key,
                    comment_ids: Vec::new(),
                }
            })
            .comment_ids
            .push(comment.id.clone());
    }

    if dropped > 0 {
        debug!(
            "Normalization dropped {} of {} comments as empty",
            dropped,
            comments.len()
        );
    }

    order
        .into_iter()
        .map(|key| groups.remove(&key).expect("group recorded for key"))
        .collect()
}
