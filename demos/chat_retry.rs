//! Chat retry example: wrap a flaky backend call the way a chat action does.
//!
//! This example shows how to:
//! - Classify failures and read their kind, severity and user message
//! - Retry a flaky operation with exponential backoff and progress messages
//! - Build an error log record and hand it to a sink on terminal failure
//!
//! # Running
//!
//! ```bash
//! cargo run --example chat_retry
//! ```

use categorized_retry::{
    build_log_record, classify, ErrorLogSink, Failure, LogContext, RetryExecutor, RetryPolicy,
    TracingErrorSink,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Demonstrates classification of typical backend messages
fn demonstrate_classification() {
    println!("=== Classification ===\n");

    for message in [
        "Failed to fetch",
        "Missing or insufficient permissions.",
        "Field supplierName is required",
        "Firestore backend unavailable",
        "Request timed out",
        "Document not found",
        "429 Too Many Requests",
        "Something odd happened",
    ] {
        let error = classify(Failure::message(message));
        println!(
            "{message:<40} -> {:<10} severity={:<6} retryable={}",
            error.kind(),
            error.severity(),
            error.is_retryable()
        );
        println!("{:<40}    user: {}\n", "", error.user_message());
    }
}

/// Demonstrates a supplier search that recovers after two network failures
async fn demonstrate_recovery() {
    println!("=== Retry with backoff ===\n");

    let policy = RetryPolicy {
        initial_delay: Duration::from_millis(200),
        ..RetryPolicy::default()
    };
    let executor = RetryExecutor::new(policy).with_label("Search suppliers");
    let calls = AtomicU32::new(0);

    let result = executor
        .execute_with_notify(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call < 3 {
                        Err(anyhow::anyhow!("Network request failed"))
                    } else {
                        Ok(vec!["Acme Valves Oy", "Nordic Pumps AB"])
                    }
                }
            },
            |attempt, error, delay| {
                println!(
                    "  attempt {attempt} failed ({}), retrying in {} ms...",
                    error.kind(),
                    delay.as_millis()
                );
            },
        )
        .await;

    match result {
        Ok(suppliers) => println!("  found suppliers: {suppliers:?}\n"),
        Err(error) => println!("  gave up: {}\n", error.user_message()),
    }
}

/// Demonstrates the terminal failure path: user message plus a log record
async fn demonstrate_terminal_failure() {
    println!("=== Terminal failure ===\n");

    let executor = RetryExecutor::new(RetryPolicy::default()).with_label("Create purchase requisition");
    let result = executor
        .execute(|| async { Err::<(), _>(anyhow::anyhow!("Permission denied on collection")) })
        .await;

    if let Err(error) = result {
        println!("  user sees: {}", error.user_message());

        let context = LogContext::new("Create purchase requisition")
            .function_name("create_requisition")
            .attempt(1, executor.policy().max_attempts);
        let record = build_log_record(&error, &context);
        println!("  log record: {}", record.to_json());

        if let Err(sink_error) = TracingErrorSink.record("demo-session", &record).await {
            println!("  could not record error: {sink_error}");
        }
    }
}

#[tokio::main]
async fn main() {
    demonstrate_classification();
    demonstrate_recovery().await;
    demonstrate_terminal_failure().await;
}
