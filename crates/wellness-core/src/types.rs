//! Core types for the wellness pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of text submitted for asynchronous classification.
///
/// Items are immutable once created and are consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    /// Identifier assigned by the submitter
    pub id: String,

    /// Raw UTF-8 text to classify
    pub text: String,

    /// When the item was handed to the pipeline
    pub submitted_at: DateTime<Utc>,
}

impl TextItem {
    /// Create a new item stamped with the current time
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            submitted_at: Utc::now(),
        }
    }

    /// Create an item with an explicit submission time
    pub fn with_timestamp(
        id: impl Into<String>,
        text: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            submitted_at,
        }
    }
}
