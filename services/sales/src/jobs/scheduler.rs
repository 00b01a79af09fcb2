use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::SalesServiceError;
use crate::usecase::sweep::SweepReport;

/// One reconciliation pass, as driven by the scheduler. Production
/// implements this for its concrete `ReconciliationSweep` instantiation
/// (see `state.rs`); tests substitute their own.
pub trait Sweeper: Send + Sync + 'static {
    fn sweep(&self) -> impl Future<Output = Result<SweepReport, SalesServiceError>> + Send;
}

/// Timer-driven reconciliation loop.
///
/// Explicit owned state (no statics): several scheduler instances can
/// coexist, e.g. in tests. Ticks are serialized — the sweep runs inline in
/// the timer task, and a tick that comes due mid-sweep is delayed, never
/// overlapped. Stopping guarantees no further tick starts; an in-flight
/// sweep runs to completion.
pub struct ReconciliationScheduler<S: Sweeper> {
    sweep: Arc<S>,
    /// Shutdown handle of the running timer task, when active. The spawned
    /// task detaches; closing the channel is what ends it.
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl<S: Sweeper> ReconciliationScheduler<S> {
    pub fn new(sweep: S) -> Self {
        Self {
            sweep: Arc::new(sweep),
            shutdown: Mutex::new(None),
        }
    }

    /// Start the timer loop. A no-op (with a log line) when already running.
    /// One sweep runs immediately, before the first timer tick.
    pub fn start(&self, interval: Duration) {
        let mut guard = self.shutdown.lock().unwrap();
        if guard.is_some() {
            tracing::info!("reconciliation scheduler already running");
            return;
        }
        tracing::info!(interval_secs = interval.as_secs(), "starting reconciliation scheduler");

        let (shutdown, mut rx) = watch::channel(false);
        let sweep = Arc::clone(&self.sweep);
        tokio::spawn(async move {
            // Immediate pass, outside the timer.
            log_outcome(sweep.sweep().await);

            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + interval,
                interval,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if *rx.borrow() {
                            break;
                        }
                        log_outcome(sweep.sweep().await);
                    }
                    // Shutdown requested, or the scheduler itself was dropped.
                    _ = rx.changed() => break,
                }
            }
            tracing::info!("reconciliation scheduler stopped");
        });

        *guard = Some(shutdown);
    }

    /// Stop the timer loop. A no-op (with a log line) when not running.
    /// The task winds down between sweeps; an in-flight sweep completes.
    pub fn stop(&self) {
        let mut guard = self.shutdown.lock().unwrap();
        match guard.take() {
            Some(shutdown) => {
                let _ = shutdown.send(true);
                tracing::info!("stopping reconciliation scheduler");
            }
            None => {
                tracing::info!("reconciliation scheduler is not running");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.shutdown.lock().unwrap().is_some()
    }

    /// Run one reconciliation pass on demand, propagating any error.
    pub async fn run_once(&self) -> Result<SweepReport, SalesServiceError> {
        self.sweep.sweep().await
    }
}

impl<S: Sweeper> Drop for ReconciliationScheduler<S> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.shutdown.lock() {
            if let Some(shutdown) = guard.take() {
                let _ = shutdown.send(true);
            }
        }
    }
}

fn log_outcome(result: Result<SweepReport, SalesServiceError>) {
    match result {
        Ok(report) if report.approved > 0 || report.delivered > 0 => {
            tracing::info!(
                approved = report.approved,
                delivered = report.delivered,
                "reconciliation pass complete"
            );
        }
        Ok(_) => {
            tracing::debug!("reconciliation pass complete, nothing to do");
        }
        Err(e) => {
            tracing::error!(error = %e, "reconciliation pass failed");
        }
    }
}
