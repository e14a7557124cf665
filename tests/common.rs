//! Test helper utilities for categorized-retry integration tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use categorized_retry::RetryPolicy;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Policy with millisecond delays so tests against a live mock server stay fast
pub fn create_fast_retry_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
        backoff_multiplier: 2.0,
    }
}

/// Shared request counter for mock responders and wrapped operations
pub fn create_counter() -> Arc<AtomicU32> {
    Arc::new(AtomicU32::new(0))
}

pub fn count(counter: &Arc<AtomicU32>) -> u32 {
    counter.load(Ordering::SeqCst)
}

/// GET `url` and decode JSON, failing on non-2xx statuses like a chat tool call would
pub async fn fetch_json(client: &reqwest::Client, url: &str) -> Result<Value, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await
}
