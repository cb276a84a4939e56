//! Lexicon-based sentiment scorer
//!
//! Counts whole tokens found in fixed positive and negative word lists and
//! turns the balance into a polarity score in `[-1.0, 1.0]`.

use crate::classifier::{tokenize, Classifier};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use wellness_core::Result;

/// Scores strictly above this are positive, strictly below its negation negative
pub const POLARITY_THRESHOLD: f64 = 0.1;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "happy", "joy", "love", "best",
    "perfect", "beautiful", "fantastic", "brilliant", "outstanding", "favorite", "enjoy",
    "enjoyed", "enjoying", "enjoys", "pleased", "pleasure", "delighted", "satisfied",
    "recommend", "recommended", "recommends", "recommending",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "worst", "sad", "angry", "hate", "disappointed",
    "poor", "ugly", "dislike", "disliked", "dislikes", "disliking", "unhappy", "unpleasant",
    "unsatisfied", "displeased",
];

/// Sentiment polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label for a clamped score
    pub fn from_score(score: f64) -> Self {
        if score > POLARITY_THRESHOLD {
            Self::Positive
        } else if score < -POLARITY_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of sentiment analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// The analyzed text, verbatim
    pub text: String,

    /// Polarity label
    #[serde(rename = "sentiment")]
    pub label: SentimentLabel,

    /// Polarity score in `[-1.0, 1.0]`
    pub score: f64,

    /// Always `score.abs()`
    pub confidence: f64,
}

impl SentimentResult {
    fn neutral(text: &str) -> Self {
        Self {
            text: text.to_string(),
            label: SentimentLabel::Neutral,
            score: 0.0,
            confidence: 0.0,
        }
    }
}

/// Sentiment classifier backed by fixed word sets.
///
/// The word sets are built once and never mutated, so a single instance can
/// be shared across workers behind an `Arc` without locking.
pub struct SentimentClassifier {
    name: String,
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl SentimentClassifier {
    pub fn new() -> Self {
        Self::with_lexicon("sentiment", POSITIVE_WORDS, NEGATIVE_WORDS)
    }

    /// Build a classifier over custom word lists. Words are lowercased.
    pub fn with_lexicon<P, N>(name: impl Into<String>, positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            name: name.into(),
            positive: positive
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            negative: negative
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Score `text` synchronously
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let lowered = text.to_lowercase();

        let mut total = 0usize;
        let mut positive_hits = 0i64;
        let mut negative_hits = 0i64;

        for token in tokenize(&lowered) {
            total += 1;
            if self.positive.contains(token) {
                positive_hits += 1;
            }
            if self.negative.contains(token) {
                negative_hits += 1;
            }
        }

        if total == 0 {
            return SentimentResult::neutral(text);
        }

        let score = ((positive_hits - negative_hits) as f64 / total as f64).clamp(-1.0, 1.0);

        SentimentResult {
            text: text.to_string(),
            label: SentimentLabel::from_score(score),
            score,
            confidence: score.abs(),
        }
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Classifier for SentimentClassifier {
    type Output = SentimentResult;

    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        Ok(self.analyze(text))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
