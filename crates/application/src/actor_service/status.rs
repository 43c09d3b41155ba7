use actordeck_core::{ApiKey, AppResult};
use actordeck_domain::{RunResult, RunStatus, extract_error_details};
use tracing::{debug, warn};

use super::ActorService;

impl ActorService {
    /// Reads the current state of a run.
    ///
    /// Succeeded runs include their dataset items and failed runs the
    /// error-like lines from the end of their log. Secondary fetch failures
    /// are logged and leave the corresponding field empty. Nothing here
    /// changes the run, so the call is safe to repeat.
    pub async fn run_status(&self, api_key: &ApiKey, run_id: &str) -> AppResult<RunResult> {
        let gateway = self.gateway(api_key);
        let run = gateway.find_run(run_id).await?;

        debug!(
            run_id,
            status = run.status.as_str(),
            exit_code = ?run.exit_code,
            "run status fetched"
        );

        let mut results = Vec::new();
        let mut error_details = None;

        match (&run.status, run.default_dataset_id.as_deref()) {
            (RunStatus::Succeeded, Some(dataset_id)) => {
                match gateway.list_dataset_items(dataset_id).await {
                    Ok(items) => results = items,
                    Err(error) => {
                        warn!(run_id, dataset_id, error = %error, "could not fetch run results");
                    }
                }
            }
            (RunStatus::Failed, _) => match gateway.run_log(run_id).await {
                Ok(log) => error_details = extract_error_details(log.as_str()),
                Err(error) => warn!(run_id, error = %error, "could not fetch run log"),
            },
            _ => {}
        }

        Ok(RunResult {
            results: Some(results),
            error_details,
            exit_code: run.exit_code,
            ..RunResult::summary(&run)
        })
    }
}
