//! Retry logic with exponential backoff
//!
//! This module re-runs failing async operations with:
//! - Classification of every failure via [`classify`](crate::classify())
//! - Immediate return on non-retryable kinds (validation, permission, not found)
//! - Exponential backoff: 1s, 2s, 4s, 8s, 16s, capped at 30s by default
//! - An `on_retry` hook for "retrying in N seconds" feedback in the UI

use crate::classify::{classify, Failure};
use crate::error::{ClassifiedError, ClassifiedResult, ErrorDetails, ErrorKind, ErrorSeverity};
use crate::logging::{log_debug, log_error, log_warn};

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

const DEFAULT_LABEL: &str = "Operation";

/// Retry policy configuration
///
/// Serialized with camelCase keys and delays in whole milliseconds:
///
/// ```json
/// { "maxAttempts": 5, "initialDelayMs": 1000, "maxDelayMs": 30000, "backoffMultiplier": 2.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    #[serde(rename = "initialDelayMs", with = "duration_ms")]
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    #[serde(rename = "maxDelayMs", with = "duration_ms")]
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a validated policy.
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> ClassifiedResult<Self> {
        let policy = Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Parse and validate a policy from its JSON form.
    pub fn from_json(raw: &str) -> ClassifiedResult<Self> {
        let policy: Self = serde_json::from_str(raw).map_err(|e| {
            ClassifiedError::validation(format!("retry policy is not valid JSON: {e}"))
        })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check the policy invariants.
    ///
    /// # Errors
    ///
    /// Returns a non-retryable [`ErrorKind::Validation`] error if:
    /// - `max_attempts` is zero
    /// - `max_delay` is shorter than `initial_delay`
    /// - `backoff_multiplier` is not a finite number greater than 1
    pub fn validate(&self) -> ClassifiedResult<()> {
        if self.max_attempts == 0 {
            return Err(ClassifiedError::validation("maxAttempts must be at least 1"));
        }
        if self.max_delay < self.initial_delay {
            return Err(ClassifiedError::validation(
                "maxDelayMs must be greater than or equal to initialDelayMs",
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(ClassifiedError::validation(
                "backoffMultiplier must be greater than 1",
            ));
        }
        Ok(())
    }

    /// Delay actually slept for a given uncapped delay.
    pub(crate) fn capped(&self, delay: Duration) -> Duration {
        delay.min(self.max_delay)
    }

    /// Next uncapped delay. Keeps compounding past `max_delay`, saturating at `Duration::MAX`.
    pub(crate) fn grow(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.backoff_multiplier)
            .unwrap_or(Duration::MAX)
    }
}

/// Retry executor that classifies failures and applies exponential backoff
///
/// Holds no per-call state, so one executor can serve many concurrent calls.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    label: String,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Name used for this operation in logs and in the fallback error.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> ClassifiedResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        self.execute_with_notify(operation, |_, _, _| {}).await
    }

    /// Execute an operation with retry logic, calling `on_retry` before each backoff sleep
    ///
    /// `on_retry` receives the attempt that just failed, its classified
    /// error and the delay about to be slept. It is not called after the
    /// final attempt or for non-retryable errors.
    pub async fn execute_with_notify<F, Fut, T, E, R>(
        &self,
        mut operation: F,
        mut on_retry: R,
    ) -> ClassifiedResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
        R: FnMut(u32, &ClassifiedError, Duration),
    {
        let mut delay = self.policy.initial_delay;

        for attempt in 1..=self.policy.max_attempts {
            log_debug!(
                operation = %self.label,
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                "Executing operation with retry logic"
            );

            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => classify(error),
            };

            if !error.is_retryable() || attempt == self.policy.max_attempts {
                log_error!(
                    operation = %self.label,
                    attempt = attempt,
                    max_attempts = self.policy.max_attempts,
                    error_kind = %error.kind(),
                    severity = %error.severity(),
                    retryable = error.is_retryable(),
                    error = %error,
                    "Operation failed, giving up"
                );
                return Err(error);
            }

            let current_delay = self.policy.capped(delay);
            log_warn!(
                operation = %self.label,
                attempt = attempt,
                max_attempts = self.policy.max_attempts,
                error_kind = %error.kind(),
                severity = %error.severity(),
                delay_ms = current_delay.as_millis() as u64,
                error = %error,
                "Operation failed, retrying after delay"
            );
            on_retry(attempt, &error, current_delay);
            sleep(current_delay).await;
            delay = self.policy.grow(delay);
        }

        Err(self.exhausted_without_attempt())
    }

    /// Fallback when the loop never ran (a zero-attempt policy).
    fn exhausted_without_attempt(&self) -> ClassifiedError {
        let error = ClassifiedError::new(
            ErrorKind::Unknown,
            format!(
                "{} failed after {} attempts",
                self.label, self.policy.max_attempts
            ),
            ErrorDetails::new()
                .with_field("operation", json!(self.label))
                .with_field("attempts", json!(self.policy.max_attempts)),
            ErrorSeverity::High,
            false,
        );
        log_error!(
            operation = %self.label,
            max_attempts = self.policy.max_attempts,
            "Retry loop finished without a result"
        );
        error
    }
}

/// Run `operation` under `policy`, the one-call form of [`RetryExecutor`].
///
/// `label` defaults to `"Operation"` when `None`.
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation: F,
    policy: &RetryPolicy,
    on_retry: Option<&mut dyn FnMut(u32, &ClassifiedError, Duration)>,
    label: Option<&str>,
) -> ClassifiedResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Failure>,
{
    let executor = RetryExecutor::new(policy.clone()).with_label(label.unwrap_or(DEFAULT_LABEL));
    match on_retry {
        Some(on_retry) => executor.execute_with_notify(operation, on_retry).await,
        None => executor.execute(operation).await,
    }
}

/// Serde adapter storing a `Duration` as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
