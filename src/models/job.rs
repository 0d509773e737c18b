use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a LightX order as reported by the order-status endpoint.
///
/// Unrecognized values are kept verbatim in `Other` and treated as still
/// processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Init,
    Active,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Init => "init",
            JobStatus::Active => "active",
            JobStatus::Failed => "failed",
            JobStatus::Other(value) => value,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Active | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "init" => JobStatus::Init,
            "active" => JobStatus::Active,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a LightX order.
///
/// Submission responses carry the retry hints, order-status responses carry
/// `output`; whichever fields a response omits default to zero or `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub order_id: String,
    #[serde(default)]
    pub max_retries_allowed: u32,
    #[serde(default)]
    pub avg_response_time_in_sec: u32,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Final outcome handed back to the caller once an order is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub order_id: String,
    pub status: JobStatus,
    pub output: Option<String>,
    /// Status polls issued before the order finished
    pub polls: u32,
    pub completed_at: DateTime<Utc>,
}

impl JobResult {
    pub fn from_job(job: Job, polls: u32) -> Self {
        Self {
            order_id: job.order_id,
            status: job.status,
            output: job.output,
            polls,
            completed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Active
    }
}
