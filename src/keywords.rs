use std::collections::{HashMap, HashSet};

use crate::config::KeywordConfig;
use crate::models::Keyword;

/// Common English words excluded from keyword candidates.
const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "both", "but", "by", "can", "could", "did", "do",
    "does", "doing", "down", "each", "few", "for", "from", "further", "had", "has", "have", "he",
    "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "just", "me", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "out", "over", "own", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours",
];

const MIN_WORD_LEN: usize = 2;

#[derive(Default)]
struct TermStats {
    /// Total occurrences across the whole corpus token stream.
    frequency: usize,
    /// Sum of normalized positions (0 at the start of the stream, 1 at the
    /// end) over every occurrence.
    position_sum: f64,
    /// Number of distinct texts containing the term.
    text_count: usize,
}

/// Unsupervised statistical keyword ranking over the full corpus of unique
/// normalized texts. Lower score = more relevant: terms that are frequent,
/// appear early, and spread across many texts score lowest. Candidates too
/// similar (character-trigram Jaccard >= `dedup_threshold`) to an already
/// selected phrase are skipped, so the result never carries near-duplicates.
///
/// The positional component is measured over a canonical (lexicographic)
/// ordering of the texts, so the result is a pure function of the corpus as
/// a set: callers may pass the texts in any order.
///
/// Corpora smaller than `top_n` simply yield fewer keywords.
pub fn extract(corpus: &[String], top_n: usize, config: &KeywordConfig) -> Vec<Keyword> {
    if corpus.is_empty() || top_n == 0 {
        return Vec::new();
    }

    let stopwords: HashSet<&str> = STOP_WORDS
        .iter()
        .copied()
        .chain(config.extra_stopwords.iter().map(String::as_str))
        .collect();

    let mut ordered: Vec<&String> = corpus.iter().collect();
    ordered.sort_unstable();

    // Single pass over the concatenated token stream, tracking per-text
    // membership for the spread component.
    let mut stats: HashMap<String, TermStats> = HashMap::new();
    let mut stream_len = 0usize;
    let mut positions: Vec<(String, usize)> = Vec::new();
    for text in ordered {
        let mut seen_in_text: HashSet<String> = HashSet::new();
        for token in tokenize(text, &stopwords) {
            positions.push((token.clone(), stream_len));
            stream_len += 1;
            if seen_in_text.insert(token.clone()) {
                stats.entry(token).or_default().text_count += 1;
            }
        }
    }
    if stream_len == 0 {
        return Vec::new();
    }
    for (token, position) in positions {
        let entry = stats.entry(token).or_default();
        entry.frequency += 1;
        entry.position_sum += position as f64 / stream_len as f64;
    }

    let total_texts = corpus.len() as f64;
    let mut scored: Vec<(String, f64)> = stats
        .into_iter()
        .map(|(term, s)| {
            let mean_position = s.position_sum / s.frequency as f64;
            let spread = s.text_count as f64 / total_texts;
            // Early position raises relevance a little; frequency and
            // spread raise it a lot. Lower is better.
            let score = (1.0 + mean_position) / (s.frequency as f64 * (1.0 + spread));
            (term, score)
        })
        .collect();
    scored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut selected: Vec<Keyword> = Vec::with_capacity(top_n);
    for (phrase, score) in scored {
        if selected.len() == top_n {
            break;
        }
        let redundant = selected
            .iter()
            .any(|k| trigram_jaccard(&k.phrase, &phrase) >= config.dedup_threshold);
        if redundant {
            continue;
        }
        selected.push(Keyword {
            phrase,
            score,
            rank: selected.len() + 1,
        });
    }
    selected
}

fn tokenize<'a>(text: &'a str, stopwords: &'a HashSet<&str>) -> impl Iterator<Item = String> + 'a {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(move |w| w.len() >= MIN_WORD_LEN && !stopwords.contains(w.as_str()))
}

/// Jaccard similarity over character trigrams; short strings fall back to
/// exact comparison.
fn trigram_jaccard(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count() as f64;
    let union = ta.union(&tb).count() as f64;
    inter / union
}

fn trigrams(s: &str) -> HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return HashSet::new();
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}
