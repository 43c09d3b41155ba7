use std::sync::Arc;
use std::time::Duration;

use actordeck_core::AppResult;
use actordeck_domain::RunResult;
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Anything that can report the current state of a run.
#[async_trait]
pub trait RunStatusSource: Send + Sync {
    async fn run_status(&self, run_id: &str) -> AppResult<RunResult>;
}

/// Latest observation published by a [`RunPoller`].
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Waiting,
    Status(RunResult),
    Failed(String),
}

/// Background task polling one run until it reaches a terminal status.
///
/// The task is aborted when the handle is dropped. Polls never overlap: the
/// next tick is scheduled only after the previous request finished.
pub struct RunPoller {
    updates: watch::Receiver<PollEvent>,
    task: JoinHandle<()>,
}

impl RunPoller {
    pub fn start(source: Arc<dyn RunStatusSource>, run_id: String, period: Duration) -> Self {
        let (sender, updates) = watch::channel(PollEvent::Waiting);
        let task = tokio::spawn(poll_until_settled(source, run_id, period, sender));

        Self { updates, task }
    }

    /// Waits for the next observation; `None` once polling has stopped.
    pub async fn changed(&mut self) -> Option<PollEvent> {
        self.updates.changed().await.ok()?;
        Some(self.updates.borrow_and_update().clone())
    }
}

impl Drop for RunPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_until_settled(
    source: Arc<dyn RunStatusSource>,
    run_id: String,
    period: Duration,
    sender: watch::Sender<PollEvent>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match source.run_status(&run_id).await {
            Ok(result) => {
                let terminal = result.status.is_terminal();
                debug!(run_id = %run_id, status = %result.status.as_str(), "polled run status");

                if sender.send(PollEvent::Status(result)).is_err() || terminal {
                    return;
                }
            }
            Err(error) => {
                warn!(run_id = %run_id, error = %error, "run status poll failed");
                let _ = sender.send(PollEvent::Failed(error.to_string()));
                return;
            }
        }
    }
}
