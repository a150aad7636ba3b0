//! Observability for builder sessions.
//!
//! This crate provides:
//! - `SessionId` - Unique editing-session identifier
//! - `SessionLogger` - Structured logging tagged with session and page
//! - `EditorMetrics` - Per-session action and backend-call counters

mod logging;
mod metrics;
mod session;

pub use logging::*;
pub use metrics::*;
pub use session::*;
