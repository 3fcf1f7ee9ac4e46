use crate::error::SearchError;
use crate::models::Location;
use crate::search::{validate_location, SearchOrchestrator, SearchOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// One year
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

/// Re-runs a search on a fixed interval, starting immediately
pub struct PeriodicSearch;

impl PeriodicSearch {
    /// Spawns the schedule. Overlap with other runs is left to the
    /// orchestrator's own running guard.
    pub fn start(
        orchestrator: Arc<SearchOrchestrator>,
        location: &Location,
        interval_hours: u64,
    ) -> Result<ScheduleHandle, SearchError> {
        let every = Some(interval_hours)
            .filter(|hours| (1..=MAX_INTERVAL_HOURS).contains(hours))
            .and_then(|hours| hours.checked_mul(60 * 60))
            .map(Duration::from_secs)
            .ok_or(SearchError::InvalidInterval)?;
        Self::start_every(orchestrator, location, every)
    }

    pub fn start_every(
        orchestrator: Arc<SearchOrchestrator>,
        location: &Location,
        every: Duration,
    ) -> Result<ScheduleHandle, SearchError> {
        if every.is_zero() {
            return Err(SearchError::InvalidInterval);
        }
        let location = validate_location(location)?;
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        info!(
            "Starting periodic search every {:?} for {}",
            every,
            location.label()
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                if *cancel_rx.borrow() {
                    break;
                }

                // Not raced against cancellation: a started run always finishes
                info!("Running scheduled property search...");
                match orchestrator.search(&location).await {
                    Ok(SearchOutcome::Completed(run)) => {
                        info!(found = run.total_found, "Scheduled search finished");
                    }
                    Ok(SearchOutcome::AlreadyRunning(_)) => {
                        info!("Skipped scheduled search, another run is active");
                    }
                    Err(err) => error!("Error in periodic search: {}", err),
                }
            }
            info!("Periodic search stopped");
        });

        Ok(ScheduleHandle { cancel_tx, task })
    }
}

/// Owner of a running schedule. Dropping it ends the schedule like `cancel`.
pub struct ScheduleHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Stops future runs. A run already in flight completes first.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Cancels and waits for the schedule task, including any in-flight run
    pub async fn stop(self) {
        self.cancel();
        if let Err(err) = self.task.await {
            error!("Periodic search task failed: {}", err);
        }
    }
}
