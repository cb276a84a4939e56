//! Pipeline counters
//!
//! Every recording bumps an in-process atomic (readable through
//! [`PipelineMetrics::snapshot`]) and the matching `metrics` crate counter,
//! which reaches Prometheus when a recorder is installed.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const ITEMS_SUBMITTED: &str = "wellness_items_submitted_total";
pub const ITEMS_DROPPED: &str = "wellness_items_dropped_total";
pub const ITEMS_PROCESSED: &str = "wellness_items_processed_total";
pub const RESULTS_PUBLISHED: &str = "wellness_results_published_total";
pub const CLASSIFICATION_FAULTS: &str = "wellness_classification_faults_total";
pub const CLASSIFICATION_LATENCY: &str = "wellness_classification_latency_us";

/// Register descriptions with the installed recorder
pub fn describe() {
    metrics::describe_counter!(ITEMS_SUBMITTED, "Items offered to the ingress queue");
    metrics::describe_counter!(
        ITEMS_DROPPED,
        "Items or results dropped, labelled by queue and reason"
    );
    metrics::describe_counter!(ITEMS_PROCESSED, "Items classified by a worker");
    metrics::describe_counter!(RESULTS_PUBLISHED, "Results accepted by the egress queue");
    metrics::describe_counter!(
        CLASSIFICATION_FAULTS,
        "Items skipped because the classifier failed or panicked"
    );
    metrics::describe_histogram!(
        CLASSIFICATION_LATENCY,
        metrics::Unit::Microseconds,
        "Per-item classification latency in microseconds"
    );
}

/// Shared, cheaply cloneable pipeline counters
#[derive(Clone, Default)]
pub struct PipelineMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    submitted: AtomicU64,
    accepted: AtomicU64,
    dropped_ingress: AtomicU64,
    rejected: AtomicU64,
    processed: AtomicU64,
    published: AtomicU64,
    dropped_egress: AtomicU64,
    faults: AtomicU64,
    classification_latency_us: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// An item entered the ingress queue
    pub fn record_accepted(&self) {
        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
        self.inner.accepted.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ITEMS_SUBMITTED).increment(1);
    }

    /// An item was dropped because the ingress queue was full
    pub fn record_ingress_drop(&self) {
        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
        self.inner.dropped_ingress.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ITEMS_SUBMITTED).increment(1);
        metrics::counter!(ITEMS_DROPPED, "queue" => "ingress", "reason" => "full").increment(1);
    }

    /// An item was refused because the pipeline is shutting down
    pub fn record_rejected(&self) {
        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
        self.inner.rejected.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ITEMS_SUBMITTED).increment(1);
        metrics::counter!(ITEMS_DROPPED, "queue" => "ingress", "reason" => "shutdown")
            .increment(1);
    }

    /// A worker finished classifying an item
    pub fn record_processed(&self, latency_us: u64) {
        self.inner.processed.fetch_add(1, Ordering::Relaxed);
        self.inner
            .classification_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        metrics::counter!(ITEMS_PROCESSED).increment(1);
        metrics::histogram!(CLASSIFICATION_LATENCY).record(latency_us as f64);
    }

    /// A result reached the egress queue
    pub fn record_published(&self) {
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(RESULTS_PUBLISHED).increment(1);
    }

    /// A result was dropped because the egress queue was full or closed
    pub fn record_egress_drop(&self) {
        self.inner.dropped_egress.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ITEMS_DROPPED, "queue" => "egress", "reason" => "full").increment(1);
    }

    /// The classifier failed on an item
    pub fn record_fault(&self) {
        self.inner.faults.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(CLASSIFICATION_FAULTS).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> PipelineSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        PipelineSnapshot {
            submitted: load(&self.inner.submitted),
            accepted: load(&self.inner.accepted),
            dropped_ingress: load(&self.inner.dropped_ingress),
            rejected: load(&self.inner.rejected),
            processed: load(&self.inner.processed),
            published: load(&self.inner.published),
            dropped_egress: load(&self.inner.dropped_egress),
            faults: load(&self.inner.faults),
            classification_latency_us: load(&self.inner.classification_latency_us),
        }
    }
}

/// Point-in-time copy of the pipeline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    pub submitted: u64,
    pub accepted: u64,
    pub dropped_ingress: u64,
    pub rejected: u64,
    pub processed: u64,
    pub published: u64,
    pub dropped_egress: u64,
    pub faults: u64,
    pub classification_latency_us: u64,
}

impl PipelineSnapshot {
    /// Average classification latency per processed item
    pub fn avg_latency_us(&self) -> u64 {
        if self.processed == 0 {
            0
        } else {
            self.classification_latency_us / self.processed
        }
    }

    /// Share of submissions that never reached a worker
    pub fn ingress_drop_rate(&self) -> f64 {
        if self.submitted == 0 {
            0.0
        } else {
            (self.dropped_ingress + self.rejected) as f64 / self.submitted as f64
        }
    }

    /// Share of classified items whose result was lost at egress
    pub fn egress_drop_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.dropped_egress as f64 / self.processed as f64
        }
    }
}
