//! Stream processor: worker pool and lifecycle control
//!
//! ```text
//! submit ──► ingress ──► worker × N ──► egress ──► results()
//!                          │
//!                  reaper waits for all workers,
//!                  then closes egress
//! ```
//!
//! Workers stop on the first of two independent signals: the cancellation
//! token passed to [`StreamProcessor::start`], or [`StreamProcessor::stop`].
//! Egress is closed only by the reaper, after the last worker has exited,
//! so no worker can publish into a closed queue.

use crate::config::ProcessorConfig;
use crate::types::{AnalysisResult, LifecycleState, SubmitOutcome};
use crate::worker::{ActiveWorker, SharedClassifier, Worker};
use futures::Stream;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wellness_classifiers::SentimentClassifier;
use wellness_core::{BoundedQueue, Error, Result, TextItem, TryEnqueueError};
use wellness_telemetry::{PipelineMetrics, PipelineSnapshot};

/// Concurrent classification engine
pub struct StreamProcessor {
    config: ProcessorConfig,
    classifier: SharedClassifier,
    ingress: Arc<BoundedQueue<TextItem>>,
    egress: Arc<BoundedQueue<AnalysisResult>>,
    metrics: PipelineMetrics,
    state: Arc<Mutex<LifecycleState>>,
    stop_signal: CancellationToken,
    active: Arc<AtomicUsize>,
    /// Flipped to `true` by the reaper once every worker has exited
    drained: Arc<watch::Sender<bool>>,
}

impl StreamProcessor {
    /// Create a processor running the built-in sentiment classifier
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        Self::with_classifier(config, Arc::new(SentimentClassifier::new()))
    }

    /// Create a processor running a custom classifier
    pub fn with_classifier(config: ProcessorConfig, classifier: SharedClassifier) -> Result<Self> {
        let config = config.normalized();
        let (drained, _) = watch::channel(false);

        Ok(Self {
            ingress: Arc::new(BoundedQueue::new(config.ingress_capacity)?),
            egress: Arc::new(BoundedQueue::new(config.egress_capacity)?),
            config,
            classifier,
            metrics: PipelineMetrics::new(),
            state: Arc::new(Mutex::new(LifecycleState::Created)),
            stop_signal: CancellationToken::new(),
            active: Arc::new(AtomicUsize::new(0)),
            drained: Arc::new(drained),
        })
    }

    /// Spawn the worker pool and its reaper.
    ///
    /// Must be called from within a Tokio runtime. Cancelling `cancel` stops
    /// the workers just like [`stop`](Self::stop) does, without waiting.
    pub fn start(&self, cancel: CancellationToken) -> Result<()> {
        {
            let mut state = self.state.lock();
            if *state != LifecycleState::Created {
                return Err(Error::lifecycle(format!(
                    "cannot start stream processor in state {:?}",
                    *state
                )));
            }
            *state = LifecycleState::Running;
        }

        info!(
            workers = self.config.workers,
            ingress_capacity = self.config.ingress_capacity,
            egress_capacity = self.config.egress_capacity,
            classifier = self.classifier.name(),
            "Starting stream processor"
        );

        let mut workers = JoinSet::new();
        for id in 0..self.config.workers {
            let worker = Worker {
                id,
                ingress: self.ingress.clone(),
                egress: self.egress.clone(),
                classifier: self.classifier.clone(),
                metrics: self.metrics.clone(),
                _active: ActiveWorker::register(&self.active),
            };
            workers.spawn(worker.run(cancel.clone(), self.stop_signal.clone()));
        }

        let ingress = self.ingress.clone();
        let egress = self.egress.clone();
        let state = self.state.clone();
        let drained = self.drained.clone();

        tokio::spawn(async move {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "worker task terminated abnormally");
                }
            }

            ingress.close();
            egress.close();
            *state.lock() = LifecycleState::Stopped;
            drained.send_replace(true);

            info!("All workers exited, results stream closed");
        });

        Ok(())
    }

    /// Stop the pool and wait until every worker has exited.
    ///
    /// Submissions are refused from the moment this is called. Items still
    /// buffered in ingress are discarded; results already in egress remain
    /// drainable. Safe to call repeatedly and concurrently.
    pub async fn stop(&self) {
        let started = {
            let mut state = self.state.lock();
            match *state {
                LifecycleState::Stopped => return,
                LifecycleState::Created => {
                    *state = LifecycleState::Stopped;
                    false
                }
                LifecycleState::Running | LifecycleState::Stopping => {
                    *state = LifecycleState::Stopping;
                    true
                }
            }
        };

        info!("Stopping stream processor");
        self.ingress.close();
        self.stop_signal.cancel();

        if started {
            let mut drained = self.drained.subscribe();
            if drained.wait_for(|done| *done).await.is_err() {
                warn!("reaper went away before all workers were observed exiting");
            }
        } else {
            self.egress.close();
        }

        *self.state.lock() = LifecycleState::Stopped;
        info!("Stream processor stopped");
    }

    /// Offer an item to the pool without blocking.
    ///
    /// Only a running processor accepts items; a full ingress queue drops
    /// the item.
    pub fn submit(&self, item: TextItem) -> SubmitOutcome {
        let rejected = {
            let state = self.state.lock();
            if *state != LifecycleState::Running {
                Some((item, *state))
            } else {
                match self.ingress.try_enqueue(item) {
                    Ok(()) => None,
                    Err(TryEnqueueError::Full(item)) => {
                        warn!(item_id = %item.id, "Ingress queue full, dropping item");
                        self.metrics.record_ingress_drop();
                        return SubmitOutcome::Dropped;
                    }
                    Err(TryEnqueueError::Closed(item)) => Some((item, *state)),
                }
            }
        };

        match rejected {
            None => {
                debug!("item queued for processing");
                self.metrics.record_accepted();
                SubmitOutcome::Accepted
            }
            Some((item, state)) => {
                debug!(item_id = %item.id, ?state, "processor not running, rejecting item");
                self.metrics.record_rejected();
                SubmitOutcome::Rejected
            }
        }
    }

    /// Handle for draining classified results
    pub fn results(&self) -> ResultStream {
        ResultStream {
            egress: self.egress.clone(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Number of workers that have not exited yet
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Point-in-time view of queues, workers and counters
    pub fn stats(&self) -> ProcessorStats {
        ProcessorStats {
            state: self.state(),
            workers: self.config.workers,
            active_workers: self.active_workers(),
            ingress_len: self.ingress.len(),
            ingress_capacity: self.ingress.capacity(),
            egress_len: self.egress.len(),
            egress_capacity: self.egress.capacity(),
            counters: self.metrics.snapshot(),
        }
    }
}

impl Drop for StreamProcessor {
    fn drop(&mut self) {
        // Detached workers must not outlive their owner
        self.ingress.close();
        self.stop_signal.cancel();
    }
}

/// Serializable processor status
#[derive(Debug, Clone, Serialize)]
pub struct ProcessorStats {
    pub state: LifecycleState,
    pub workers: usize,
    pub active_workers: usize,
    pub ingress_len: usize,
    pub ingress_capacity: usize,
    pub egress_len: usize,
    pub egress_capacity: usize,
    pub counters: PipelineSnapshot,
}

/// Consumer side of the egress queue.
///
/// Clones share the same queue: each result goes to exactly one consumer.
#[derive(Clone)]
pub struct ResultStream {
    egress: Arc<BoundedQueue<AnalysisResult>>,
}

impl ResultStream {
    /// Wait for the next result; `None` once egress is closed and drained
    pub async fn recv(&self) -> Option<AnalysisResult> {
        self.egress.recv().await
    }

    /// Take a buffered result without waiting
    pub fn try_recv(&self) -> Option<AnalysisResult> {
        self.egress.try_recv()
    }

    /// No result will ever be delivered again
    pub fn is_exhausted(&self) -> bool {
        self.egress.is_exhausted()
    }

    /// Adapt into a `futures::Stream` that ends when egress is exhausted
    pub fn into_stream(self) -> impl Stream<Item = AnalysisResult> + Send + 'static {
        futures::stream::unfold(self, |results| async move {
            let next = results.recv().await?;
            Some((next, results))
        })
    }
}
