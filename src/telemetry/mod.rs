pub mod http;
mod init;
pub mod metrics;

pub use http::{RecordResponse, RequestSpan, X_REQUEST_ID};
pub use init::{TelemetryGuard, init_telemetry};
