//! Buffered telemetry sink (§4.6), structured logging, and Prometheus
//! metrics — carried from the teacher's `hip3-telemetry` crate and
//! generalized to this system.

pub mod error;
pub mod logging;
pub mod metrics;
pub mod sink;
pub mod transport;

pub use error::{Result, TelemetryError};
pub use logging::init_logging;
pub use sink::{TelemetrySink, FLUSH_INTERVAL, FLUSH_THRESHOLD, STREAM_CAP};
pub use transport::{ColdLogTransport, HttpColdLogTransport, NoopColdLogTransport};
