//! Invocation metrics.
//!
//! # Metrics
//! - `serverless_invocations_total` (counter): invocations by platform and status
//! - `serverless_invocation_duration_seconds` (histogram): end-to-end latency by platform
//! - `serverless_chain_short_circuits_total` (counter): chains halted by a filter
//! - `serverless_dispatch_failures_total` (counter): invocation-fatal dispatch errors
//! - `serverless_cold_starts_total` (counter): facade constructions by result
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; exporting is the host's business (no listener)
//! - Without an installed recorder every call is a no-op

use std::time::Instant;

pub fn record_invocation(platform: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "serverless_invocations_total",
        "platform" => platform,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "serverless_invocation_duration_seconds",
        "platform" => platform
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_short_circuit() {
    metrics::counter!("serverless_chain_short_circuits_total").increment(1);
}

pub fn record_dispatch_failure() {
    metrics::counter!("serverless_dispatch_failures_total").increment(1);
}

pub fn record_cold_start(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("serverless_cold_starts_total", "result" => result).increment(1);
}
