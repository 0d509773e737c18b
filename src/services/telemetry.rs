//! Metric names and recording helpers.
//!
//! Recording goes through the `metrics` facade; without an installed recorder
//! every call is a no-op, so the client never requires an exporter.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

pub const UPLOADS_TOTAL: &str = "lightx_uploads_total";
pub const UPLOAD_BYTES: &str = "lightx_upload_bytes";
pub const JOBS_SUBMITTED_TOTAL: &str = "lightx_jobs_submitted_total";
pub const POLLS_TOTAL: &str = "lightx_polls_total";
pub const JOBS_COMPLETED_TOTAL: &str = "lightx_jobs_completed_total";
pub const JOB_DURATION_SECONDS: &str = "lightx_job_duration_seconds";

/// Register metric descriptions with whatever recorder the application installed.
pub fn describe_metrics() {
    describe_counter!(UPLOADS_TOTAL, "Images uploaded through pre-signed URLs");
    describe_histogram!(UPLOAD_BYTES, metrics::Unit::Bytes, "Size of each uploaded image");
    describe_counter!(JOBS_SUBMITTED_TOTAL, "Jobs submitted to LightX");
    describe_counter!(POLLS_TOTAL, "Order-status requests issued");
    describe_counter!(
        JOBS_COMPLETED_TOTAL,
        "Jobs that reached a final outcome, labelled by outcome"
    );
    describe_histogram!(
        JOB_DURATION_SECONDS,
        "Time from submission to final outcome of a LightX job"
    );
}

pub fn record_upload(bytes: usize) {
    counter!(UPLOADS_TOTAL).increment(1);
    histogram!(UPLOAD_BYTES).record(bytes as f64);
}

pub fn record_submission(endpoint_path: &str) {
    counter!(JOBS_SUBMITTED_TOTAL, "endpoint" => endpoint_path.to_string()).increment(1);
}

pub fn record_poll() {
    counter!(POLLS_TOTAL).increment(1);
}

/// Outcome label values for [`JOBS_COMPLETED_TOTAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Active,
    Failed,
    Exhausted,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Active => "active",
            Outcome::Failed => "failed",
            Outcome::Exhausted => "max_retries",
            Outcome::Error => "error",
        }
    }
}

pub fn record_completion(outcome: Outcome, elapsed: Duration) {
    counter!(JOBS_COMPLETED_TOTAL, "outcome" => outcome.as_str()).increment(1);
    histogram!(JOB_DURATION_SECONDS, "outcome" => outcome.as_str()).record(elapsed.as_secs_f64());
}
