//! Telemetry and structured logging components for botshell.
//!
//! Handles log redaction, JSON output generation, file rotation, and
//! per-update pipeline trace events.

pub mod logger;
pub mod redact;
pub mod trace;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
pub use trace::{PipelineEvent, PipelineTrace, TraceEntry};
