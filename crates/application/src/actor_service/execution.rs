use actordeck_core::{ApiKey, AppResult};
use actordeck_domain::{RESULTS_PENDING_WARNING, RunInput, RunResult, RunStatus};
use tracing::{info, warn};

use super::ActorService;

impl ActorService {
    /// Starts an actor run and returns its outcome within the synchronous wait window.
    ///
    /// Actors that need start URLs are checked before anything is sent. A run
    /// that succeeds inside the window comes back with its dataset items; when
    /// those cannot be read yet the result carries a warning instead of an
    /// error. Any other status comes back as a summary with a progress note.
    pub async fn execute_actor(
        &self,
        api_key: &ApiKey,
        actor_id: &str,
        input: RunInput,
    ) -> AppResult<RunResult> {
        input.ensure_start_urls(&self.capability_rules, actor_id)?;

        let gateway = self.gateway(api_key);
        let run = gateway
            .start_run(actor_id, &input, self.run_options)
            .await?;

        info!(
            actor_id,
            run_id = %run.id,
            status = run.status.as_str(),
            "actor run submitted"
        );

        if run.status != RunStatus::Succeeded {
            return Ok(RunResult::unfinished(&run));
        }

        let items = match run.default_dataset_id.as_deref() {
            Some(dataset_id) => gateway.list_dataset_items(dataset_id).await,
            // Nothing to query without a dataset id; answer as if the read failed.
            None => {
                warn!(run_id = %run.id, "succeeded run has no default dataset");
                return Ok(RunResult {
                    results: Some(Vec::new()),
                    warning: Some(RESULTS_PENDING_WARNING.to_owned()),
                    ..RunResult::summary(&run)
                });
            }
        };

        match items {
            Ok(items) => Ok(RunResult {
                results: Some(items),
                ..RunResult::summary(&run)
            }),
            Err(error) => {
                warn!(run_id = %run.id, error = %error, "run results not yet readable");
                Ok(RunResult {
                    results: Some(Vec::new()),
                    warning: Some(RESULTS_PENDING_WARNING.to_owned()),
                    ..RunResult::summary(&run)
                })
            }
        }
    }
}
