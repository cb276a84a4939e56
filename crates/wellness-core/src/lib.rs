//! Wellness Core
//!
//! Core types and primitives shared across the wellness pipeline crates.
//!
//! This crate provides:
//! - The submitted text item type
//! - Error types and result handling
//! - The bounded queue used for pipeline ingress and egress

pub mod error;
pub mod queue;
pub mod types;

pub use error::{Error, Result};
pub use queue::{BoundedQueue, TryEnqueueError};
pub use types::TextItem;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::queue::{BoundedQueue, TryEnqueueError};
    pub use crate::types::TextItem;
}
