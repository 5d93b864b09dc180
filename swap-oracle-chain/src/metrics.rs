//! Metrics definitions for oracle-callback submission.

/// Metrics key for retry attempts while submitting a callback transaction.
pub const METRICS_ID_SUBMIT_RETRIES: &str = "swap_oracle.submit.retries";
/// Metrics key for the duration of a [`crate::submitter::TransactionSubmitter::submit`] call.
pub const METRICS_ID_SUBMIT_DURATION: &str = "swap_oracle.submit.duration";

/// Describes all metrics used by this crate with the `metrics` crate.
pub fn describe_metrics() {
    metrics::describe_counter!(
        METRICS_ID_SUBMIT_RETRIES,
        metrics::Unit::Count,
        "Number of retry attempts while submitting an oracle callback transaction"
    );
    metrics::describe_histogram!(
        METRICS_ID_SUBMIT_DURATION,
        metrics::Unit::Milliseconds,
        "Duration of a single TransactionSubmitter::submit call, including retries"
    );
}
