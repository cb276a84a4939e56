//! Stream processor configuration

use serde::{Deserialize, Serialize};

/// Worker count used when none (or zero) is configured
pub const DEFAULT_WORKERS: usize = 3;

/// Queue capacity used when none (or zero) is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Sizing for the worker pool and its two queues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Number of parallel workers draining the ingress queue
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the queue feeding the workers
    #[serde(default = "default_capacity")]
    pub ingress_capacity: usize,

    /// Capacity of the queue holding results for consumers
    #[serde(default = "default_capacity")]
    pub egress_capacity: usize,
}

impl ProcessorConfig {
    /// Replace zero values with the defaults
    pub fn normalized(self) -> Self {
        Self {
            workers: non_zero_or(self.workers, DEFAULT_WORKERS),
            ingress_capacity: non_zero_or(self.ingress_capacity, DEFAULT_QUEUE_CAPACITY),
            egress_capacity: non_zero_or(self.egress_capacity, DEFAULT_QUEUE_CAPACITY),
        }
    }

    /// Builder-style worker count override
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Builder-style override for both queue capacities
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.ingress_capacity = capacity;
        self.egress_capacity = capacity;
        self
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            ingress_capacity: DEFAULT_QUEUE_CAPACITY,
            egress_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

fn non_zero_or(value: usize, default: usize) -> usize {
    if value == 0 {
        default
    } else {
        value
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}
