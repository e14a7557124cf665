//! Delivery of error log records to telemetry collaborators.
//!
//! A chat session typically keeps its own log (for example a document per
//! session in Firestore). Implement [`ErrorLogSink`] for that store; the
//! crate ships [`TracingErrorSink`], which emits records as tracing events.

use crate::error::ErrorSeverity;
use crate::log_record::ErrorLogRecord;
use crate::logging::{log_error, log_warn};
use async_trait::async_trait;

/// Receives error log records keyed by an opaque session identifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorLogSink: Send + Sync {
    /// Store or forward one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the record.
    async fn record(&self, session_id: &str, record: &ErrorLogRecord) -> anyhow::Result<()>;
}

/// Sink that writes records to the tracing subscriber.
///
/// Low and medium severities log at WARN, high and critical at ERROR.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

#[async_trait]
impl ErrorLogSink for TracingErrorSink {
    async fn record(&self, session_id: &str, record: &ErrorLogRecord) -> anyhow::Result<()> {
        let payload = serde_json::to_string(record)?;
        match record.error_severity {
            ErrorSeverity::Low | ErrorSeverity::Medium => log_warn!(
                session_id = %session_id,
                event = record.event,
                error_kind = %record.error_kind,
                severity = %record.error_severity,
                retryable = record.technical_details.retryable,
                user_action = %record.user_action,
                request_id = ?record.request_id,
                record = %payload,
                "Error recorded"
            ),
            ErrorSeverity::High | ErrorSeverity::Critical => log_error!(
                session_id = %session_id,
                event = record.event,
                error_kind = %record.error_kind,
                severity = %record.error_severity,
                retryable = record.technical_details.retryable,
                user_action = %record.user_action,
                request_id = ?record.request_id,
                record = %payload,
                "Error recorded"
            ),
        }
        Ok(())
    }
}
