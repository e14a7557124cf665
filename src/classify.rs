//! Failure classification.
//!
//! [`classify`] maps any [`Failure`] to a [`ClassifiedError`] by
//! case-insensitive substring matching on the failure's message. The keyword
//! groups are checked in a fixed order and the first match wins, so
//! `"Network request failed due to invalid token"` is a network error even
//! though it also mentions `invalid`.
//!
//! The message of an error object includes its whole cause chain, so a
//! `"permission denied"` under an `anyhow` context line is still a
//! permission error.
//!
//! Message sniffing is fragile, but callers and tests depend on the exact
//! keyword list and order below. Change them only together.

use crate::error::{ClassifiedError, ErrorDetails, ErrorKind, OriginalError, SharedError};
use crate::logging::log_debug;
use serde_json::Value;
use std::sync::Arc;

/// Keyword groups in priority order.
const KEYWORD_RULES: &[(ErrorKind, &[&str])] = &[
    (ErrorKind::Network, &["network", "fetch", "connection"]),
    (ErrorKind::Permission, &["permission", "unauthorized", "forbidden"]),
    (ErrorKind::Validation, &["invalid", "required", "must be"]),
    (ErrorKind::Database, &["firebase", "firestore", "database"]),
    (ErrorKind::Timeout, &["timeout", "timed out"]),
    (ErrorKind::NotFound, &["not found", "404"]),
    (ErrorKind::RateLimit, &["rate limit", "too many requests", "429"]),
];

/// Input to classification.
///
/// The variant tag says whether the failure has already been classified,
/// so re-classifying is a pattern match rather than a type test.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Already classified; passes through unchanged.
    Classified(ClassifiedError),
    /// An error object exposing a message.
    Error {
        /// Text the classifier matches against.
        message: String,
        source: SharedError,
    },
    /// A thrown value with no message (plain string, number, null, ...).
    Value(Value),
}

impl Failure {
    /// A message-bearing failure with no richer error type behind it.
    pub fn message(message: impl Into<String>) -> Self {
        Self::from(anyhow::Error::msg(message.into()))
    }

    /// Wrap any error object; its `Display` output and source chain become the message.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error {
            message: message_with_sources(&error),
            source: Arc::new(error),
        }
    }
}

impl From<ClassifiedError> for Failure {
    fn from(error: ClassifiedError) -> Self {
        Self::Classified(error)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<ClassifiedError>() {
            Ok(classified) => Self::Classified(classified),
            Err(error) => {
                // Alternate form includes every context layer and the root cause.
                let message = format!("{error:#}");
                let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = error.into();
                Self::Error {
                    message,
                    source: Arc::from(boxed),
                }
            }
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync + 'static>> for Failure {
    fn from(error: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        match error.downcast::<ClassifiedError>() {
            Ok(classified) => Self::Classified(*classified),
            Err(error) => Self::Error {
                message: message_with_sources(&*error),
                source: Arc::from(error),
            },
        }
    }
}

impl From<std::io::Error> for Failure {
    fn from(error: std::io::Error) -> Self {
        Self::from_error(error)
    }
}

impl From<reqwest::Error> for Failure {
    /// Drops the URL and appends the source chain ("connection refused",
    /// "operation timed out") to the message.
    fn from(error: reqwest::Error) -> Self {
        Self::from_error(error.without_url())
    }
}

impl From<Value> for Failure {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for Failure {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<&str> for Failure {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

/// `error` followed by each of its sources, joined with `": "`.
fn message_with_sources(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut cause = error.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

/// Classify any failure. Never panics and always returns a value.
pub fn classify(failure: impl Into<Failure>) -> ClassifiedError {
    match failure.into() {
        Failure::Classified(error) => error,
        Failure::Error { message, source } => {
            let kind = match_keywords(&message).unwrap_or(ErrorKind::Unknown);
            let details = ErrorDetails::new().with_original(OriginalError::Error(source));
            build(kind, message, details)
        }
        Failure::Value(value) => {
            let message = match &value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let details = ErrorDetails::new().with_original(OriginalError::Value(value));
            build(ErrorKind::Unknown, message, details)
        }
    }
}

/// First keyword group whose keyword occurs in `message`, ignoring case.
pub(crate) fn match_keywords(message: &str) -> Option<ErrorKind> {
    let lowered = message.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(kind, _)| *kind)
}

fn build(kind: ErrorKind, message: String, details: ErrorDetails) -> ClassifiedError {
    let error = ClassifiedError::new(
        kind,
        message,
        details,
        kind.default_severity(),
        kind.default_retryable(),
    );
    log_debug!(
        error_kind = %error.kind(),
        severity = %error.severity(),
        retryable = error.is_retryable(),
        message = %error.technical_message(),
        "Classified failure"
    );
    error
}
