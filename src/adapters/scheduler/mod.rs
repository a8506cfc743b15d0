//! Background scheduler driving the reminder sweep.
//!
//! Runs the sweep on a fixed interval until a shutdown signal arrives. The
//! sweep itself is idempotent, so an extra pass after restart or overlap
//! with a manual run never produces duplicate reminders.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

use crate::application::notify::ReminderSweep;

/// Configuration for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// How often to run a sweep pass.
    pub sweep_interval: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

/// Background service running [`ReminderSweep`] on an interval.
pub struct ReminderScheduler {
    sweep: Arc<ReminderSweep>,
    config: ReminderSchedulerConfig,
    running: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(sweep: Arc<ReminderSweep>) -> Self {
        Self::with_config(sweep, ReminderSchedulerConfig::default())
    }

    pub fn with_config(sweep: Arc<ReminderSweep>, config: ReminderSchedulerConfig) -> Self {
        Self {
            sweep,
            config,
            running: AtomicBool::new(false),
        }
    }

    /// One guarded pass. Returns `false` without sweeping when another pass
    /// is still in flight; the dedup keys make skipping safe.
    pub async fn tick(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("reminder sweep already running, skipping pass");
            return false;
        }

        if let Err(e) = self.sweep.run().await {
            warn!(error = %e, "reminder sweep failed");
        }
        self.running.store(false, Ordering::Release);
        true
    }

    /// Runs sweep passes until the shutdown channel flips to `true`.
    ///
    /// A failed pass is logged and retried on the next tick; transient
    /// database trouble must not kill the scheduler.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.sweep_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("reminder scheduler stopping");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}
