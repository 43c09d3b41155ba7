use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use actordeck_core::{AppError, AppResult};
use actordeck_domain::{Actor, RunResult, RunStatus};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Icon shown next to a run status.
#[must_use]
pub fn status_icon(status: &RunStatus) -> &'static str {
    match status {
        RunStatus::Succeeded => "✅",
        RunStatus::Failed => "❌",
        RunStatus::Running => "⏳",
        RunStatus::Aborted => "🛑",
        RunStatus::TimedOut => "⏰",
        _ => "❓",
    }
}

#[must_use]
pub fn status_label(status: &RunStatus) -> String {
    format!("{} {}", status_icon(status), status.as_str())
}

/// Formats the run time as `Ns`, `Nm Ns` or `Nh Nm`; a run still going is measured up to `now`.
#[must_use]
pub fn format_duration(
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let Some(started_at) = started_at else {
        return "N/A".to_owned();
    };

    let millis = (finished_at.unwrap_or(now) - started_at)
        .num_milliseconds()
        .max(0);
    let seconds = (millis + 500) / 1000;

    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// `stats.computeUnits` with four decimals.
#[must_use]
pub fn compute_units(stats: Option<&Value>) -> String {
    stats
        .and_then(|stats| stats.get("computeUnits"))
        .and_then(Value::as_f64)
        .map_or_else(|| "N/A".to_owned(), |units| format!("{units:.4}"))
}

#[must_use]
pub fn results_file_name(run_id: &str) -> String {
    format!("apify-results-{run_id}.json")
}

/// Writes the output items as pretty JSON into `directory`.
pub async fn save_results(directory: &Path, result: &RunResult) -> AppResult<PathBuf> {
    let path = directory.join(results_file_name(&result.run_id));
    let contents = serde_json::to_vec_pretty(result.items())
        .map_err(|error| AppError::Internal(format!("failed to encode results: {error}")))?;

    tokio::fs::write(&path, contents).await.map_err(|error| {
        AppError::Internal(format!("failed to write '{}': {error}", path.display()))
    })?;

    Ok(path)
}

/// One catalog line: title, id and run count.
#[must_use]
pub fn actor_line(actor: &Actor) -> String {
    format!(
        "{} ({}) · {} runs",
        actor.title, actor.id, actor.stats.total_runs
    )
}

/// Full results screen for one run.
#[must_use]
pub fn run_report(result: &RunResult, now: DateTime<Utc>) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "Run {}", result.run_id);
    let _ = writeln!(report, "  Status:        {}", status_label(&result.status));
    let _ = writeln!(
        report,
        "  Duration:      {}",
        format_duration(result.started_at, result.finished_at, now)
    );
    let _ = writeln!(
        report,
        "  Compute units: {}",
        compute_units(result.stats.as_ref())
    );

    if let Some(message) = &result.message {
        let _ = writeln!(report, "  ℹ️  {message}");
    }
    if let Some(warning) = &result.warning {
        let _ = writeln!(report, "  ⚠️  {warning}");
    }

    match result.status {
        RunStatus::Succeeded => {
            let items = result.items();
            let _ = writeln!(report, "\nResults ({} items)", items.len());
            if items.is_empty() {
                let _ = writeln!(report, "  No results returned.");
            } else {
                let pretty = serde_json::to_string_pretty(items).unwrap_or_default();
                let _ = writeln!(report, "{pretty}");
            }
        }
        RunStatus::Failed => {
            let _ = writeln!(report, "\nThe run failed.");
            if let Some(details) = &result.error_details {
                let _ = writeln!(report, "Error details:\n{details}");
            }
            if let Some(exit_code) = result.exit_code {
                let _ = writeln!(report, "Exit code: {exit_code}");
            }
            let _ = writeln!(
                report,
                "Check the input values and the run log in the Apify console."
            );
        }
        ref status if !status.is_terminal() => {
            let _ = writeln!(
                report,
                "\nThe run is still in progress; status refreshes automatically."
            );
        }
        _ => {}
    }

    report
}
