//! Wellness Telemetry
//!
//! Counters for the classification pipeline: what was accepted, dropped,
//! classified, published, and what faulted.

pub mod counters;

pub use counters::{PipelineMetrics, PipelineSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::counters::{PipelineMetrics, PipelineSnapshot};
}
