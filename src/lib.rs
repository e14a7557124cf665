//! # categorized-retry
//!
//! Categorized error classification and retry-with-backoff for chat front
//! ends that call databases (Firestore) and LLM APIs (Gemini, OpenRouter).
//!
//! ## Key Features
//!
//! - **Classification**: any failure becomes a [`ClassifiedError`] with a kind,
//!   severity, retryable flag and a user-facing message
//! - **Retry**: [`RetryExecutor`] retries transient failures with exponential backoff
//! - **Log records**: [`build_log_record`] produces structured records for telemetry
//! - **Sinks**: [`ErrorLogSink`] hands records to a session log or to tracing
//!
//! ## Example
//!
//! ```rust,no_run
//! use categorized_retry::{build_log_record, LogContext, RetryExecutor, RetryPolicy};
//!
//! # async fn search_suppliers(_query: &str) -> anyhow::Result<Vec<String>> { Ok(vec![]) }
//! # async fn example() {
//! let executor = RetryExecutor::new(RetryPolicy::default()).with_label("Search suppliers");
//!
//! let result = executor
//!     .execute_with_notify(
//!         || search_suppliers("valves"),
//!         |attempt, error, delay| {
//!             println!("Attempt {attempt} failed ({}), retrying in {}s", error.kind(), delay.as_secs());
//!         },
//!     )
//!     .await;
//!
//! if let Err(error) = result {
//!     println!("{}", error.user_message());
//!     let record = build_log_record(&error, &LogContext::new("Search suppliers"));
//!     println!("{}", record.to_json());
//! }
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod classify;
pub mod error;
pub mod log_record;
pub mod retry;
pub mod sink;

#[cfg(test)]
pub mod tests;

pub use classify::{classify, Failure};
pub use error::{
    ClassifiedError, ClassifiedResult, ErrorDetails, ErrorKind, ErrorSeverity, OriginalError,
    SharedError,
};
pub use log_record::{build_log_record, ErrorLogRecord, LogContext, TechnicalDetails, ERROR_EVENT};
pub use retry::{retry_with_backoff, RetryExecutor, RetryPolicy};
pub use sink::{ErrorLogSink, TracingErrorSink};
