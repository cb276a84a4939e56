//! Wellness Stream
//!
//! Asynchronous classification engine: a fixed pool of workers draining a
//! bounded ingress queue and publishing sentiment results to a bounded
//! egress queue.
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use wellness_core::TextItem;
//! use wellness_stream::{ProcessorConfig, StreamProcessor};
//!
//! # async fn run() -> wellness_core::Result<()> {
//! let processor = StreamProcessor::new(ProcessorConfig::default())?;
//! processor.start(CancellationToken::new())?;
//!
//! processor.submit(TextItem::new("item-1", "I love this"));
//! if let Some(result) = processor.results().recv().await {
//!     println!("{} -> {}", result.item.id, result.result.label);
//! }
//!
//! processor.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod processor;
pub mod types;
mod worker;

pub use config::{ProcessorConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use processor::{ProcessorStats, ResultStream, StreamProcessor};
pub use types::{AnalysisResult, LifecycleState, SubmitOutcome};
pub use worker::SharedClassifier;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::ProcessorConfig;
    pub use crate::processor::{ResultStream, StreamProcessor};
    pub use crate::types::{AnalysisResult, LifecycleState, SubmitOutcome};
}
