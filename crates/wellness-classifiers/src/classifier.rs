//! Classifier trait

use async_trait::async_trait;
use wellness_core::Result;

/// Trait for all classifiers
///
/// Implementations must be total over UTF-8 input, including the empty
/// string. Returning an error is reserved for genuinely malformed input and
/// is handled per item by callers.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Typed result produced for a single text
    type Output: Send;

    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<Self::Output>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Split lowercased text into whitespace-delimited tokens
pub(crate) fn tokenize(lowered: &str) -> impl Iterator<Item = &str> {
    lowered.split_whitespace()
}
