//! Wellness Classifiers
//!
//! Deterministic lexicon classifiers for short text.
//!
//! - [`SentimentClassifier`]: whole-token positive/negative word balance
//! - [`TopicClassifier`]: substring matching against five wellness categories
//!
//! Both are built once, never mutated, and are safe to share across
//! workers without synchronization.

pub mod classifier;
pub mod sentiment;
pub mod topics;

pub use classifier::Classifier;
pub use sentiment::{SentimentClassifier, SentimentLabel, SentimentResult};
pub use topics::{TopicClassifier, WellnessTopic, WellnessTopicResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::Classifier;
    pub use crate::sentiment::{SentimentClassifier, SentimentLabel, SentimentResult};
    pub use crate::topics::{TopicClassifier, WellnessTopic, WellnessTopicResult};
}
