//! Pipeline Trace Logger
//!
//! Structured per-update events (blocked, resolved, replied, failed)
//! written to rolling NDJSON logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    Blocked {
        event: String,
        middleware: String,
    },
    Resolved {
        input: String,
        status: String,
    },
    Replied {
        command: String,
        chars: usize,
    },
    Failed {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct TraceEntry {
    pub bot: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct PipelineTrace;

impl PipelineTrace {
    /// Logs one pipeline event, scrubbing user-supplied strings first.
    pub fn record(bot: &str, mut event: PipelineEvent) {
        match &mut event {
            PipelineEvent::Resolved { input, .. } => {
                *input = redact_sensitive_data(input);
            }
            PipelineEvent::Failed { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            PipelineEvent::Blocked { .. } | PipelineEvent::Replied { .. } => {}
        }

        let entry = TraceEntry {
            bot: bot.into(),
            timestamp: Utc::now(),
            event,
        };

        // Leverage tracing to output NDJSON correctly wrapped
        info!(target: "pipeline_events", event = ?entry, "Pipeline trace event");
    }
}
