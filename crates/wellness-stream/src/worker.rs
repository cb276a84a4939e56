//! Pool worker: drain ingress, classify, publish to egress

use crate::types::AnalysisResult;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use wellness_classifiers::{Classifier, SentimentResult};
use wellness_core::{BoundedQueue, TextItem};
use wellness_telemetry::PipelineMetrics;

/// Classifier shared by every worker in the pool
pub type SharedClassifier = Arc<dyn Classifier<Output = SentimentResult>>;

/// Keeps the pool's live-worker count accurate, even if a worker unwinds
pub(crate) struct ActiveWorker {
    count: Arc<AtomicUsize>,
}

impl ActiveWorker {
    pub(crate) fn register(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self {
            count: count.clone(),
        }
    }
}

impl Drop for ActiveWorker {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) ingress: Arc<BoundedQueue<TextItem>>,
    pub(crate) egress: Arc<BoundedQueue<AnalysisResult>>,
    pub(crate) classifier: SharedClassifier,
    pub(crate) metrics: PipelineMetrics,
    pub(crate) _active: ActiveWorker,
}

impl Worker {
    /// Loop until cancellation, an explicit stop, or a closed ingress queue
    pub(crate) async fn run(self, cancel: CancellationToken, stop: CancellationToken) {
        debug!(worker = self.id, "worker started");

        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(worker = self.id, "worker received cancellation");
                    break;
                }
                _ = stop.cancelled() => {
                    debug!(worker = self.id, "worker received stop signal");
                    break;
                }
                item = self.ingress.recv() => match item {
                    Some(item) => item,
                    None => {
                        debug!(worker = self.id, "ingress queue closed");
                        break;
                    }
                },
            };

            self.process(item).await;
        }

        debug!(worker = self.id, "worker exited");
    }

    async fn process(&self, item: TextItem) {
        debug!(worker = self.id, item_id = %item.id, "processing item");
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.classifier.classify(&item.text))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(
                    worker = self.id,
                    item_id = %item.id,
                    classifier = self.classifier.name(),
                    error = %e,
                    "classification failed, skipping item"
                );
                self.metrics.record_fault();
                return;
            }
            Err(_) => {
                warn!(
                    worker = self.id,
                    item_id = %item.id,
                    classifier = self.classifier.name(),
                    "classifier panicked, skipping item"
                );
                self.metrics.record_fault();
                return;
            }
        };

        self.metrics
            .record_processed(start.elapsed().as_micros() as u64);
        debug!(
            worker = self.id,
            item_id = %item.id,
            sentiment = %result.label,
            score = result.score,
            "analyzed item"
        );

        let analysis = AnalysisResult {
            item,
            result,
            processed_at: Utc::now(),
        };

        match self.egress.try_enqueue(analysis) {
            Ok(()) => {
                self.metrics.record_published();
                debug!(worker = self.id, "published result");
            }
            Err(rejected) => {
                let analysis = rejected.into_inner();
                warn!(
                    worker = self.id,
                    item_id = %analysis.item.id,
                    "egress queue full, dropping result"
                );
                self.metrics.record_egress_drop();
            }
        }
    }
}
