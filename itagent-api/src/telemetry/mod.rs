//! iT-Agent Telemetry
//!
//! Structured logging via `tracing-subscriber` and a per-request span
//! middleware. No external collector is required.

pub mod middleware;
pub mod tracer;

pub use middleware::observability_middleware;
pub use tracer::{init_tracer, LogFormat, TelemetryConfig};
