//! Cron scheduler for the periodic expiry sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use booking_core::config::SweeperConfig;
use booking_core::error::AppError;
use booking_core::traits::Clock;

use crate::sweeper::ExpirySweeper;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Register the expiry sweep on `config.schedule`.
    ///
    /// Every tick sweeps as of `clock.now()`.
    pub async fn register_expiry_sweep(
        &self,
        config: &SweeperConfig,
        sweeper: Arc<ExpirySweeper>,
        clock: Arc<dyn Clock>,
    ) -> Result<(), AppError> {
        let job = CronJob::new_async(config.schedule.as_str(), move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            let clock = Arc::clone(&clock);
            Box::pin(async move {
                tracing::debug!("Running scheduled expiry sweep");
                sweeper.sweep(clock.now()).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid sweeper schedule '{}': {e}",
                config.schedule
            ))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add expiry sweep schedule: {e}")))?;

        tracing::info!(schedule = %config.schedule, "Registered: expiry_sweep");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
