//! Stream processor types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wellness_classifiers::SentimentResult;
use wellness_core::TextItem;

/// A classified item as published to the egress queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The submitted item
    pub item: TextItem,

    /// Sentiment computed by the worker
    pub result: SentimentResult,

    /// When the worker finished classifying
    pub processed_at: DateTime<Utc>,
}

/// What happened to a submitted item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Queued for a worker
    Accepted,
    /// Discarded because the ingress queue was full
    Dropped,
    /// Refused because the processor is not running
    Rejected,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Processor lifecycle, advancing strictly in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Created,
    Running,
    Stopping,
    Stopped,
}
