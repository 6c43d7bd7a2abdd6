//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (request counters, latency histogram, gate rejections)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → GET /metrics (Prometheus text exposition)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through spans via the trace layer
//! - Metric labels use the matched route pattern, never the raw path

pub mod logging;
pub mod metrics;
