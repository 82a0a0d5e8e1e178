//! Metrics collection.
//!
//! # Metrics
//! - `nav_navigations_total` (counter): settled or rejected navigations by outcome
//! - `nav_init_attempts_total` (counter): initializer attempts by component, result
//! - `nav_init_duration_seconds` (histogram): time to a terminal init result
//! - `nav_subscriber_errors_total` (counter): subscriber failures
//!
//! # Design Decisions
//! - Uses the `metrics` facade; the host installs a recorder (or none)
//! - Low-overhead metric updates, no-ops without a recorder

use std::time::Instant;

/// Record a navigation outcome.
pub fn record_navigation(outcome: &'static str) {
    ::metrics::counter!("nav_navigations_total", "outcome" => outcome).increment(1);
}

/// Record one initializer attempt.
pub fn record_init_attempt(component: &str, success: bool) {
    let result = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "nav_init_attempts_total",
        "component" => component.to_string(),
        "result" => result
    )
    .increment(1);
}

/// Record how long a component took to reach a terminal result.
pub fn record_init_duration(component: &str, start: Instant) {
    ::metrics::histogram!("nav_init_duration_seconds", "component" => component.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a failing route subscriber.
pub fn record_subscriber_error() {
    ::metrics::counter!("nav_subscriber_errors_total").increment(1);
}
