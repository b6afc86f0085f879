//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, plain or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with request ids from the HTTP layer
//! - Unmatched blog paths are logged and counted, never raised
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
