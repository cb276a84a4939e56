//! Wellness topic tagger
//!
//! Tags text with one or more of five wellness categories. A token counts
//! toward a category once for every category term it contains as a
//! substring, so "stressed" scores for `mental_health` through "stress".

use crate::classifier::{tokenize, Classifier};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use wellness_core::{Error, Result};

/// The fixed wellness category vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessTopic {
    MentalHealth,
    PhysicalHealth,
    EmotionalWellbeing,
    SocialConnection,
    SpiritualWellness,
}

impl WellnessTopic {
    /// Every category, in declaration order
    pub const ALL: [WellnessTopic; 5] = [
        Self::MentalHealth,
        Self::PhysicalHealth,
        Self::EmotionalWellbeing,
        Self::SocialConnection,
        Self::SpiritualWellness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MentalHealth => "mental_health",
            Self::PhysicalHealth => "physical_health",
            Self::EmotionalWellbeing => "emotional_wellbeing",
            Self::SocialConnection => "social_connection",
            Self::SpiritualWellness => "spiritual_wellness",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn default_terms(self) -> &'static [&'static str] {
        match self {
            Self::MentalHealth => &[
                "anxiety", "depression", "stress", "meditation", "mindfulness", "therapy",
                "counseling", "mental", "psychology",
            ],
            Self::PhysicalHealth => &[
                "exercise", "workout", "fitness", "nutrition", "diet", "sleep", "rest",
                "recovery", "strength", "cardio",
            ],
            Self::EmotionalWellbeing => &[
                "emotions", "feelings", "happiness", "joy", "sadness", "anger", "fear",
                "gratitude", "positivity",
            ],
            Self::SocialConnection => &[
                "friends", "family", "community", "support", "relationships", "connection",
                "social", "interaction",
            ],
            Self::SpiritualWellness => &[
                "spirituality", "purpose", "meaning", "values", "beliefs", "meditation",
                "mindfulness", "reflection",
            ],
        }
    }
}

impl fmt::Display for WellnessTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WellnessTopic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| Error::classifier(format!("unknown wellness topic: {s}")))
    }
}

/// Result of topic analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessTopicResult {
    /// The analyzed text, verbatim
    pub text: String,

    /// Categories scoring at or above the threshold; empty iff nothing matched
    pub topics: BTreeSet<WellnessTopic>,

    /// Matched terms per token, capped at 1.0
    pub confidence: f64,
}

/// Topic classifier over a fixed category → terms table.
pub struct TopicClassifier {
    name: String,
    matcher: AhoCorasick,
    /// Categories owning each distinct term, indexed by pattern id
    term_topics: Vec<Vec<WellnessTopic>>,
}

impl TopicClassifier {
    pub fn new() -> Result<Self> {
        Self::with_terms(
            "wellness_topics",
            WellnessTopic::ALL.map(|topic| (topic, topic.default_terms().to_vec())),
        )
    }

    /// Build a classifier from `(topic, terms)` pairs. A term may belong to
    /// several topics; it is matched once and credited to each of them.
    pub fn with_terms<I, T, S>(name: impl Into<String>, table: I) -> Result<Self>
    where
        I: IntoIterator<Item = (WellnessTopic, T)>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = Vec::new();
        let mut term_topics: Vec<Vec<WellnessTopic>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (topic, topic_terms) in table {
            for term in topic_terms {
                let term = term.as_ref().to_lowercase();
                if term.is_empty() {
                    return Err(Error::classifier(format!(
                        "empty term configured for topic {topic}"
                    )));
                }
                let id = *index.entry(term.clone()).or_insert_with(|| {
                    terms.push(term);
                    term_topics.push(Vec::new());
                    terms.len() - 1
                });
                if !term_topics[id].contains(&topic) {
                    term_topics[id].push(topic);
                }
            }
        }

        let matcher = AhoCorasick::new(&terms).map_err(|e| {
            Error::classifier(format!("Failed to build topic term matcher: {e}"))
        })?;

        debug!(terms = terms.len(), "built wellness topic matcher");

        Ok(Self {
            name: name.into(),
            matcher,
            term_topics,
        })
    }

    /// Tag `text` synchronously
    pub fn analyze(&self, text: &str) -> WellnessTopicResult {
        let lowered = text.to_lowercase();

        let mut scores = [0usize; WellnessTopic::ALL.len()];
        let mut total_tokens = 0usize;
        let mut seen = vec![false; self.term_topics.len()];

        for token in tokenize(&lowered) {
            total_tokens += 1;
            seen.fill(false);

            // A term occurring twice inside one token still counts once
            for m in self.matcher.find_overlapping_iter(token) {
                let term = m.pattern().as_usize();
                if std::mem::replace(&mut seen[term], true) {
                    continue;
                }
                for topic in &self.term_topics[term] {
                    scores[topic.index()] += 1;
                }
            }
        }

        let max_score = scores.iter().copied().max().unwrap_or(0);
        let topics = if max_score == 0 {
            BTreeSet::new()
        } else {
            let threshold = (max_score / 2).max(1);
            WellnessTopic::ALL
                .into_iter()
                .filter(|topic| scores[topic.index()] >= threshold)
                .collect()
        };

        let confidence = if total_tokens == 0 {
            0.0
        } else {
            let matches: usize = scores.iter().sum();
            (matches as f64 / total_tokens as f64).min(1.0)
        };

        WellnessTopicResult {
            text: text.to_string(),
            topics,
            confidence,
        }
    }
}

#[async_trait::async_trait]
impl Classifier for TopicClassifier {
    type Output = WellnessTopicResult;

    async fn classify(&self, text: &str) -> Result<WellnessTopicResult> {
        Ok(self.analyze(text))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
