use crate::config::SentimentConfig;
use crate::models::{Comment, SentimentLabel, SentimentResult};

/// Fixed polarity lexicon, valences in [-4, 4]. No runtime training or
/// updates; tuned for the register of video comments.
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("angry", -2.3),
    ("annoying", -1.9),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("boring", -1.3),
    ("brilliant", 2.8),
    ("broken", -1.6),
    ("clickbait", -1.5),
    ("confusing", -1.3),
    ("cool", 1.3),
    ("disappointed", -2.2),
    ("disappointing", -2.1),
    ("dislike", -1.6),
    ("enjoy", 2.0),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("fake", -2.0),
    ("fantastic", 2.6),
    ("favorite", 2.0),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("hate", -2.7),
    ("hated", -2.6),
    ("helpful", 1.8),
    ("horrible", -2.5),
    ("impressive", 2.3),
    ("insightful", 2.0),
    ("interesting", 1.7),
    ("like", 1.5),
    ("love", 3.2),
    ("loved", 2.9),
    ("misleading", -1.9),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("poor", -1.9),
    ("problem", -1.4),
    ("problems", -1.4),
    ("recommend", 1.6),
    ("sad", -2.1),
    ("scam", -2.2),
    ("terrible", -2.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("underrated", 1.3),
    ("useful", 1.9),
    ("useless", -1.8),
    ("waste", -1.8),
    ("wonderful", 2.7),
    ("worst", -3.1),
    ("wrong", -2.1),
];

/// Intensity modifiers applied to the following sentiment word.
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.293),
    ("barely", -0.293),
    ("extremely", 0.293),
    ("incredibly", 0.293),
    ("kinda", -0.293),
    ("really", 0.293),
    ("slightly", -0.293),
    ("so", 0.293),
    ("somewhat", -0.293),
    ("super", 0.293),
    ("totally", 0.293),
    ("very", 0.293),
];

const NEGATIONS: &[&str] = &[
    "cannot", "neither", "never", "no", "none", "nor", "not", "without",
];

/// Valence flip factor when a sentiment word sits inside a negation window.
const NEGATION_SCALAR: f64 = -0.74;
/// Per-`!` emphasis added to the raw valence sum, capped at four marks.
const EXCLAMATION_BOOST: f64 = 0.292;
/// Normalization constant mapping the raw sum into [-1, 1].
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Lexicon-and-heuristics polarity scorer. `compound` is the normalized sum
/// of token valences; labels follow the configured cutoffs, by default
/// compound >= 0.05 => Positive, <= -0.05 => Negative, else Neutral.
pub struct SentimentScorer {
    config: SentimentConfig,
}

impl SentimentScorer {
    pub fn new(config: SentimentConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, text: &str) -> (f64, SentimentLabel) {
        let compound = compound_score(text);
        (compound, self.label_for(compound))
    }

    pub fn label_for(&self, compound: f64) -> SentimentLabel {
        if compound >= self.config.positive_threshold {
            SentimentLabel::Positive
        } else if compound <= self.config.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn score_comment(&self, comment: &Comment) -> SentimentResult {
        let (compound, label) = self.score(&comment.text);
        SentimentResult {
            comment_id: comment.id.clone(),
            compound,
            label,
        }
    }
}

fn compound_score(text: &str) -> f64 {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect();

    let mut sum = 0.0;
    for (i, token) in tokens.iter().enumerate() {
        let Some(valence) = lexicon_valence(token) else {
            continue;
        };
        let mut v = valence;

        // Look back up to three words for intensifiers and negation.
        let window_start = i.saturating_sub(3);
        for (back, prior) in tokens[window_start..i].iter().rev().enumerate() {
            let damping = match back {
                0 => 1.0,
                1 => 0.95,
                _ => 0.9,
            };
            if let Some(boost) = booster_increment(prior) {
                v += boost * damping * v.signum();
            }
            if is_negation(prior) {
                v *= NEGATION_SCALAR;
            }
        }
        sum += v;
    }

    if sum != 0.0 {
        let bangs = text.chars().filter(|&c| c == '!').count().min(4);
        sum += bangs as f64 * EXCLAMATION_BOOST * sum.signum();
    }

    let compound = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
    compound.clamp(-1.0, 1.0)
}

fn clean_token(raw: &str) -> String {
    raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

fn lexicon_valence(token: &str) -> Option<f64> {
    LEXICON
        .binary_search_by(|(word, _)| word.cmp(&token))
        .ok()
        .map(|i| LEXICON[i].1)
}

fn booster_increment(token: &str) -> Option<f64> {
    BOOSTERS
        .binary_search_by(|(word, _)| word.cmp(&token))
        .ok()
        .map(|i| BOOSTERS[i].1)
}

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't")
}
