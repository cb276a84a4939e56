//! Shared handler state

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wellness_classifiers::{SentimentClassifier, TopicClassifier};
use wellness_core::Result;
use wellness_stream::StreamProcessor;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Queued classification engine behind the stream endpoints
    pub processor: Arc<StreamProcessor>,

    /// Classifiers for the direct endpoints
    pub sentiment: Arc<SentimentClassifier>,
    pub topics: Arc<TopicClassifier>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,

    /// Cancelled when the server begins shutting down; ends open SSE streams
    pub shutdown: CancellationToken,

    pub keep_alive: Duration,
}

impl AppState {
    pub fn new(
        processor: Arc<StreamProcessor>,
        metrics_handle: PrometheusHandle,
        shutdown: CancellationToken,
        keep_alive: Duration,
    ) -> Result<Self> {
        Ok(Self {
            processor,
            sentiment: Arc::new(SentimentClassifier::new()),
            topics: Arc::new(TopicClassifier::new()?),
            metrics_handle,
            shutdown,
            keep_alive,
        })
    }
}
