//! Classified error types.
//!
//! Every failure that passes through this crate ends up as a
//! [`ClassifiedError`]: a kind, a severity, a retryable flag, the raw
//! technical message and a sentence that is safe to show to end users.
//!
//! # Error Handling Example
//!
//! ```rust
//! use categorized_retry::{classify, ErrorKind, Failure};
//!
//! let err = classify(Failure::message("Permission denied for collection suppliers"));
//! assert_eq!(err.kind(), ErrorKind::Permission);
//! assert!(!err.is_retryable());
//! println!("Tell user: {}", err.user_message());
//! ```
//!
//! Services that already know what went wrong raise a pre-classified error
//! directly:
//!
//! ```rust
//! use categorized_retry::{ClassifiedError, ErrorDetails, ErrorKind, ErrorSeverity};
//! use serde_json::json;
//!
//! let err = ClassifiedError::new(
//!     ErrorKind::Permission,
//!     "Insufficient permissions to create purchase requisition",
//!     ErrorDetails::new().with_field("userId", json!("u-42")),
//!     ErrorSeverity::High,
//!     false,
//! );
//! assert_eq!(err.details().field("userId"), Some(&json!("u-42")));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared handle to an arbitrary error object.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Convenient result type for operations that fail with a [`ClassifiedError`].
pub type ClassifiedResult<T> = std::result::Result<T, ClassifiedError>;

// ============================================================================
// Error categorization types
// ============================================================================

/// What went wrong, as far as message sniffing can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input; the same request will be rejected again.
    Validation,
    /// Connectivity problem between the client and a backend.
    Network,
    /// The caller is not allowed to do this.
    Permission,
    /// Firestore/Firebase or another database failed.
    Database,
    /// An external service (LLM provider, REST API) returned an error.
    Api,
    /// The operation took too long.
    Timeout,
    /// The requested resource does not exist.
    NotFound,
    /// A backend is throttling us.
    RateLimit,
    /// Anything not recognized by the classifier.
    Unknown,
}

impl ErrorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ErrorKind; 9] = [
        Self::Validation,
        Self::Network,
        Self::Permission,
        Self::Database,
        Self::Api,
        Self::Timeout,
        Self::NotFound,
        Self::RateLimit,
        Self::Unknown,
    ];

    /// Stable snake_case name, as used in log records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Permission => "permission",
            Self::Database => "database",
            Self::Api => "api",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::RateLimit => "rate_limit",
            Self::Unknown => "unknown",
        }
    }

    /// Severity assigned when this kind is produced by classification.
    pub fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Timeout | Self::RateLimit => ErrorSeverity::Low,
            Self::Permission => ErrorSeverity::High,
            Self::Validation | Self::Database | Self::Api | Self::NotFound | Self::Unknown => {
                ErrorSeverity::Medium
            }
        }
    }

    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// False for validation, permission and not-found.
    pub fn default_retryable(self) -> bool {
        !matches!(self, Self::Validation | Self::Permission | Self::NotFound)
    }

    /// User-facing sentence for this kind, interpolating `message` where useful.
    pub fn user_message(self, message: &str) -> String {
        match self {
            Self::Validation => {
                format!("Invalid input: {message}. Please check your data and try again.")
            }
            Self::Network => {
                "Network connection issue. Please check your internet connection and try again."
                    .to_string()
            }
            Self::Permission => {
                "You do not have permission to perform this action. Please contact your administrator."
                    .to_string()
            }
            Self::Database => {
                "Database connection issue. Our team has been notified. Please try again later."
                    .to_string()
            }
            Self::Api => {
                format!("External service error: {message}. Please try again in a few moments.")
            }
            Self::Timeout => {
                "The operation took too long to complete. Please try again with fewer items or contact support."
                    .to_string()
            }
            Self::NotFound => {
                format!("The requested resource was not found: {message}")
            }
            Self::RateLimit => {
                "Too many requests. Please wait a moment before trying again.".to_string()
            }
            Self::Unknown => {
                format!("An unexpected error occurred: {message}. Please try again or contact support.")
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational weight of an error, ordered from `Low` to `Critical`.
///
/// Informs logging and alerting tiers; retry decisions look only at
/// [`ClassifiedError::is_retryable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Transient; retrying is expected to help.
    Low,
    /// Retry with caution.
    Medium,
    /// Should not be retried.
    High,
    /// Must not be retried; needs attention.
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Diagnostic payload
// ============================================================================

/// The raw input a [`ClassifiedError`] was derived from.
#[derive(Debug, Clone)]
pub enum OriginalError {
    /// An error object.
    Error(SharedError),
    /// A thrown value that is not an error (string, number, null, ...).
    Value(Value),
}

impl OriginalError {
    /// The wrapped error object, if this is not a plain value.
    pub fn as_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Error(err) => Some(err.as_ref()),
            Self::Value(_) => None,
        }
    }
}

impl fmt::Display for OriginalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => write!(f, "{err}"),
            Self::Value(Value::String(s)) => f.write_str(s),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Free-form diagnostics attached to a [`ClassifiedError`].
#[derive(Debug, Clone, Default)]
pub struct ErrorDetails {
    original_error: Option<OriginalError>,
    fields: Map<String, Value>,
}

impl ErrorDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the failure this error was derived from.
    pub fn with_original(mut self, original: OriginalError) -> Self {
        self.original_error = Some(original);
        self
    }

    /// Attach an extra diagnostic field (e.g. `userId`, `requisitionData`).
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn original_error(&self) -> Option<&OriginalError> {
        self.original_error.as_ref()
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

// ============================================================================
// ClassifiedError
// ============================================================================

/// A failure with its kind, severity and retryability decided.
///
/// Immutable once built: fields are only reachable through accessors.
/// `Display` shows the technical message; [`user_message`](Self::user_message)
/// is the sentence meant for end users.
///
/// | Kind | Severity | Retryable |
/// |------|----------|-----------|
/// | `Network` | Low | Yes |
/// | `Permission` | High | No |
/// | `Validation` | Medium | No |
/// | `Database` | Medium | Yes |
/// | `Timeout` | Low | Yes |
/// | `NotFound` | Medium | No |
/// | `RateLimit` | Low | Yes |
/// | `Api` | Medium | Yes |
/// | `Unknown` | Medium | Yes |
#[derive(Error, Debug, Clone)]
#[error("{technical_message}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    severity: ErrorSeverity,
    retryable: bool,
    technical_message: String,
    user_message: String,
    details: ErrorDetails,
    #[source]
    source: Option<SharedError>,
}

impl ClassifiedError {
    /// Build a classified error with explicit severity and retryability.
    ///
    /// The user message is derived from `kind` here and never changes.
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        details: ErrorDetails,
        severity: ErrorSeverity,
        retryable: bool,
    ) -> Self {
        let technical_message = message.into();
        let user_message = kind.user_message(&technical_message);
        let source = match details.original_error() {
            Some(OriginalError::Error(err)) => Some(Arc::clone(err)),
            _ => None,
        };
        Self {
            kind,
            severity,
            retryable,
            technical_message,
            user_message,
            details,
            source,
        }
    }

    /// Build a classified error using the kind's default severity and retryability.
    pub fn of_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(
            kind,
            message,
            ErrorDetails::new(),
            kind.default_severity(),
            kind.default_retryable(),
        )
    }

    /// Shorthand for a non-retryable validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::of_kind(ErrorKind::Validation, message)
    }

    /// Shorthand for an external service error (retryable).
    pub fn api(message: impl Into<String>) -> Self {
        Self::of_kind(ErrorKind::Api, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Raw message from the underlying failure.
    pub fn technical_message(&self) -> &str {
        &self.technical_message
    }

    /// Human-readable sentence safe to show to end users.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }
}
