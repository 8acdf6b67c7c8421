//! ScheduleManager - drives a CoordinatedScheduler at a fixed delay.
//!
//! One spawned task per manager. The next tick is scheduled only after the
//! previous one returns, so ticks never overlap. `stop` lets an in-flight
//! tick finish and then refuses further ticks.
//!
//! # Loop
//! 1. Wait `initial_delay` (first tick) or `period` (every later tick).
//! 2. While waiting, watch membership events: a departed node, or a gap in
//!    the event stream, asks the scheduler for a cleanup on the next tick.
//! 3. Lock the scheduler, run one tick, release the lock.
//!
//! # Lifecycle
//! ```ignore
//! let mut manager = ScheduleManager::new(scheduler);
//! manager.start(config.initial_delay(), config.period()).await?;
//! // ...
//! manager.stop().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;

use super::scheduler::CoordinatedScheduler;
use crate::domain::{ConfigurationError, SchedulerError};
use crate::ports::MembershipEvent;

/// Handles of a spawned loop: the shutdown signal and the task to join.
struct RunningLoop {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

/// Drives one `CoordinatedScheduler` on a fixed-delay cadence.
///
/// The scheduler sits behind a tokio `Mutex` shared with the loop, so status
/// can be read between ticks through `scheduler()`.
pub struct ScheduleManager {
    scheduler: Arc<Mutex<CoordinatedScheduler>>,
    running: Option<RunningLoop>,
}

impl ScheduleManager {
    /// Wrap `scheduler`. Nothing runs until `start`.
    pub fn new(scheduler: CoordinatedScheduler) -> Self {
        Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            running: None,
        }
    }

    /// Shared handle to the scheduler, e.g. to read its status between ticks.
    pub fn scheduler(&self) -> Arc<Mutex<CoordinatedScheduler>> {
        Arc::clone(&self.scheduler)
    }

    /// Whether a loop has been started and has not ended.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.join.is_finished())
    }

    /// Spawn the periodic loop.
    ///
    /// The first tick runs after `initial_delay`, each later one `period`
    /// after the previous tick returned. Must be called inside a tokio
    /// runtime.
    ///
    /// # Errors
    /// - `AlreadyRunning` if a loop is active.
    /// - `Configuration(InvalidScheduler)` for a zero `period`.
    pub async fn start(
        &mut self,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        if period.is_zero() {
            return Err(ConfigurationError::InvalidScheduler(
                "period must be greater than zero".to_string(),
            )
            .into());
        }

        let (events, node) = {
            let scheduler = self.scheduler.lock().await;
            (
                scheduler.context().cluster.subscribe(),
                scheduler.local_node_id(),
            )
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = Arc::clone(&self.scheduler);

        let join = tokio::spawn(async move {
            schedule_loop(scheduler, Some(events), initial_delay, period, shutdown_rx).await;
        });
        tracing::info!(
            node = %node,
            initial_delay_ms = initial_delay.as_millis() as u64,
            period_ms = period.as_millis() as u64,
            "coordinated task scheduler started"
        );

        self.running = Some(RunningLoop { shutdown_tx, join });
        Ok(())
    }

    /// Ask the loop to stop without waiting for it.
    ///
    /// Useful to signal several managers at once before joining each with
    /// `stop`. A no-op when nothing is running.
    pub fn request_shutdown(&self) {
        if let Some(running) = &self.running {
            // receiver gone means the loop already ended
            let _ = running.shutdown_tx.send(true);
        }
    }

    /// Stop the loop and wait for an in-flight tick to finish.
    ///
    /// A tick in progress is never interrupted, so engine start/stop calls
    /// complete. Returns `NotRunning` if `start` was never called or the loop
    /// was already stopped.
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        let Some(running) = self.running.take() else {
            return Err(SchedulerError::NotRunning);
        };
        let _ = running.shutdown_tx.send(true);
        if let Err(e) = running.join.await {
            tracing::error!(error = %e, "schedule loop terminated abnormally");
        }
        tracing::info!("coordinated task scheduler stopped");
        Ok(())
    }
}

/// Body of the spawned task. Returns when shutdown is signalled or the
/// manager is dropped.
async fn schedule_loop(
    scheduler: Arc<Mutex<CoordinatedScheduler>>,
    mut events: Option<broadcast::Receiver<MembershipEvent>>,
    initial_delay: Duration,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut delay = initial_delay;
    let mut cleanup = false;

    'ticks: loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        // Wait out the delay, watching membership in the meantime.
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break 'ticks,
                _ = &mut sleep => break,
                event = next_event(&mut events) => match event {
                    Ok(MembershipEvent::Left(node)) => {
                        tracing::info!(node = %node, "node left the cluster, cleanup scheduled");
                        cleanup = true;
                    }
                    Ok(MembershipEvent::Joined(node)) => {
                        tracing::info!(node = %node, "node joined the cluster");
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "missed membership events, cleanup scheduled");
                        cleanup = true;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        events = None;
                    }
                },
            }
        }

        let mut guard = scheduler.lock().await;
        if std::mem::take(&mut cleanup) {
            guard.request_cleanup();
        }
        let report = guard.tick().await;
        drop(guard);

        if report.had_failures() {
            tracing::warn!(
                tick = report.tick,
                engine_failures = report.engine_failures,
                store_failures = report.store_failures,
                registry_failed = report.registry_failed,
                "tick finished with failures"
            );
        }
        delay = period;
    }
}

/// Next membership event; pends forever once the stream has closed.
async fn next_event(
    events: &mut Option<broadcast::Receiver<MembershipEvent>>,
) -> Result<MembershipEvent, broadcast::error::RecvError> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
