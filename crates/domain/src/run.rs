use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of trailing log lines scanned for error details.
pub const LOG_TAIL_LINES: usize = 50;

/// Message attached to runs that have not finished yet.
pub const STILL_RUNNING_MESSAGE: &str = "Actor is still running. Use the run ID to check status.";

/// Message attached to runs that finished without succeeding.
pub const NOT_COMPLETED_MESSAGE: &str = "Run did not complete successfully";

/// Warning attached to succeeded runs whose dataset could not be read.
pub const RESULTS_PENDING_WARNING: &str = "Run completed but results not yet available";

const ERROR_MARKERS: [&str; 3] = ["error", "failed", "exception"];

/// Lifecycle status of a run as reported by the platform.
///
/// Unknown values are kept verbatim in [`RunStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    /// Queued, not started yet.
    Ready,
    /// Executing.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Abort requested.
    Aborting,
    /// Aborted.
    Aborted,
    /// Timeout reached, shutting down.
    TimingOut,
    /// Timed out.
    TimedOut,
    /// Status this crate does not know about.
    Other(String),
}

impl RunStatus {
    /// Returns the platform's spelling of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Aborting => "ABORTING",
            Self::Aborted => "ABORTED",
            Self::TimingOut => "TIMING-OUT",
            Self::TimedOut => "TIMED-OUT",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Parses the platform's spelling of a status.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "READY" => Self::Ready,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "ABORTING" => Self::Aborting,
            "ABORTED" => Self::Aborted,
            "TIMING-OUT" => Self::TimingOut,
            "TIMED-OUT" => Self::TimedOut,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns whether the run can no longer change status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Aborted | Self::TimedOut
        )
    }
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        Self::parse(value.as_str())
    }
}

impl From<RunStatus> for String {
    fn from(value: RunStatus) -> Self {
        value.as_str().to_owned()
    }
}

/// Platform run descriptor, observed read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Run identifier.
    pub id: String,
    /// Current status.
    pub status: RunStatus,
    /// Start time.
    pub started_at: Option<DateTime<Utc>>,
    /// Finish time, absent while running.
    pub finished_at: Option<DateTime<Utc>>,
    /// Platform statistics object, passed through untouched.
    pub stats: Option<Value>,
    /// Dataset the run writes its output items to.
    pub default_dataset_id: Option<String>,
    /// Process exit code, once known.
    pub exit_code: Option<i64>,
}

/// Run summary returned to clients, optionally carrying output items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Run identifier.
    pub run_id: String,
    /// Current status.
    pub status: RunStatus,
    /// Start time.
    pub started_at: Option<DateTime<Utc>>,
    /// Finish time.
    pub finished_at: Option<DateTime<Utc>>,
    /// Platform statistics object.
    pub stats: Option<Value>,
    /// Output dataset items, absent when no fetch was attempted.
    pub results: Option<Vec<Value>>,
    /// Error-like log lines of a failed run.
    pub error_details: Option<String>,
    /// Soft problem worth showing next to an otherwise successful response.
    pub warning: Option<String>,
    /// Human-readable progress note.
    pub message: Option<String>,
    /// Process exit code.
    pub exit_code: Option<i64>,
}

impl RunResult {
    /// Builds a bare summary of `run`.
    #[must_use]
    pub fn summary(run: &Run) -> Self {
        Self {
            run_id: run.id.clone(),
            status: run.status.clone(),
            started_at: run.started_at,
            finished_at: run.finished_at,
            stats: run.stats.clone(),
            results: None,
            error_details: None,
            warning: None,
            message: None,
            exit_code: None,
        }
    }

    /// Summary of a run that has not succeeded, with a progress note.
    #[must_use]
    pub fn unfinished(run: &Run) -> Self {
        let message = if run.status.is_terminal() {
            NOT_COMPLETED_MESSAGE
        } else {
            STILL_RUNNING_MESSAGE
        };

        Self {
            message: Some(message.to_owned()),
            ..Self::summary(run)
        }
    }

    /// Returns the output items, empty when none were fetched.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        self.results.as_deref().unwrap_or_default()
    }
}

/// Scans the tail of a run log for error-like lines.
///
/// Only the last [`LOG_TAIL_LINES`] lines are considered. A line matches when
/// it contains `error`, `failed` or `exception` in any letter case. Matches
/// are joined with newlines; `None` means nothing matched.
#[must_use]
pub fn extract_error_details(log: &str) -> Option<String> {
    let lines: Vec<&str> = log.split('\n').collect();
    let tail = &lines[lines.len().saturating_sub(LOG_TAIL_LINES)..];

    let matches: Vec<&str> = tail
        .iter()
        .copied()
        .filter(|line| {
            let line = line.to_lowercase();
            ERROR_MARKERS.iter().any(|marker| line.contains(marker))
        })
        .collect();

    if matches.is_empty() {
        None
    } else {
        Some(matches.join("\n"))
    }
}
