//! Structured error log records.
//!
//! [`build_log_record`] combines a [`ClassifiedError`] with call-site
//! context into an [`ErrorLogRecord`] that telemetry sinks can store as-is.
//! Building a record performs no I/O; see [`crate::sink`] for delivery.
//!
//! ```rust
//! use categorized_retry::{build_log_record, classify, Failure, LogContext};
//! use serde_json::json;
//!
//! let error = classify(Failure::message("Request timed out"));
//! let context = LogContext::new("Search suppliers")
//!     .function_name("search_suppliers")
//!     .function_args(json!({ "query": "valves" }))
//!     .attempt(5, 5);
//! let record = build_log_record(&error, &context);
//!
//! assert_eq!(record.error_kind.as_str(), "timeout");
//! assert_eq!(record.user_action, "Search suppliers");
//! ```

use crate::error::{ClassifiedError, ErrorKind, ErrorSeverity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Event tag carried by every record.
pub const ERROR_EVENT: &str = "error_occurred";

/// Call-site context for an error log record.
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    pub user_action: String,
    pub function_name: Option<String>,
    pub function_args: Option<Value>,
    pub request_id: Option<String>,
    pub attempt_number: Option<u32>,
    pub max_attempts: Option<u32>,
}

impl LogContext {
    /// Context for the user-visible action that failed (e.g. "Create purchase requisition").
    pub fn new(user_action: impl Into<String>) -> Self {
        Self {
            user_action: user_action.into(),
            ..Self::default()
        }
    }

    pub fn function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn function_args(mut self, args: Value) -> Self {
        self.function_args = Some(args);
        self
    }

    /// Correlates the record with an LLM/API request.
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn attempt(mut self, number: u32, max_attempts: u32) -> Self {
        self.attempt_number = Some(number);
        self.max_attempts = Some(max_attempts);
        self
    }
}

/// Technical section of an [`ErrorLogRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_args: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    pub retryable: bool,
}

/// A self-contained error log entry, serialized as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogRecord {
    pub event: &'static str,
    pub error_kind: ErrorKind,
    pub error_severity: ErrorSeverity,
    pub error_message: String,
    pub technical_details: TechnicalDetails,
    pub user_action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorLogRecord {
    /// The record as a JSON value, ready for a document store.
    pub fn to_json(&self) -> Value {
        // Every field serializes infallibly: strings, integers, enums and JSON values.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Build a log record for `error` in `context`.
///
/// `error_message` falls back to the user message when the technical
/// message is empty, so it is never blank.
pub fn build_log_record(error: &ClassifiedError, context: &LogContext) -> ErrorLogRecord {
    let error_message = if error.technical_message().is_empty() {
        error.user_message().to_string()
    } else {
        error.technical_message().to_string()
    };

    ErrorLogRecord {
        event: ERROR_EVENT,
        error_kind: error.kind(),
        error_severity: error.severity(),
        error_message,
        technical_details: TechnicalDetails {
            stack: render_source_chain(error),
            function_name: context.function_name.clone(),
            function_args: context.function_args.clone(),
            attempt_number: context.attempt_number,
            max_attempts: context.max_attempts,
            retryable: error.is_retryable(),
        },
        user_action: context.user_action.clone(),
        request_id: context.request_id.clone(),
        timestamp: Utc::now(),
    }
}

/// Error followed by its `source()` chain, one cause per line.
fn render_source_chain(error: &ClassifiedError) -> Option<String> {
    let mut cause = std::error::Error::source(error)?;
    let mut stack = format!("{}: {}", error.kind(), error.technical_message());
    loop {
        stack.push_str("\n    caused by: ");
        stack.push_str(&cause.to_string());
        match cause.source() {
            Some(next) => cause = next,
            None => return Some(stack),
        }
    }
}
