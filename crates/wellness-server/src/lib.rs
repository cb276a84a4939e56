//! Wellness Server
//!
//! HTTP front end for the wellness classification engine: synchronous
//! sentiment and topic endpoints, plus queued submission with results
//! streamed back over server-sent events.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigOverrides, ServerConfig};
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
