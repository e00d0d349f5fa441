//! Recurring reconciliation and process lifecycle
//!
//! The [`Scheduler`] runs one cycle immediately on [`Scheduler::start`] and
//! then one per interval until stopped. Cycles never overlap: a tick that
//! falls due while a cycle is still running is delayed until it completes.
//! Stopping takes effect at the next cycle boundary; an in-flight cycle is
//! never interrupted.
//!
//! ## States
//!
//! ```text
//! Idle ──start()──▶ Running ──stop()──▶ Stopped
//!   └──────────────stop()──────────────────▲
//! ```

use crate::engine::{CycleReport, DdnsEngine, OutcomeAction};
use crate::error::Result;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not yet started
    Idle,
    /// Timer loop active
    Running,
    /// Terminal
    Stopped,
}

/// Shortest interval accepted by [`Scheduler::with_interval`]
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Drives [`DdnsEngine`] cycles on a fixed interval
pub struct Scheduler {
    engine: DdnsEngine,
    interval: Duration,
    state: Mutex<SchedulerState>,
    shutdown: CancellationToken,
}

impl Scheduler {
    /// Create a scheduler using the engine's configured poll interval
    pub fn new(engine: DdnsEngine) -> Self {
        let interval = Duration::from_secs(engine.config().poll_interval_secs);
        Self {
            engine,
            interval,
            state: Mutex::new(SchedulerState::Idle),
            shutdown: CancellationToken::new(),
        }
    }

    /// Override the interval between cycles
    ///
    /// A zero interval is raised to [`MIN_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    /// The engine driven by this scheduler
    pub fn engine(&self) -> &DdnsEngine {
        &self.engine
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Token cancelled when the scheduler stops
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run exactly one cycle without entering the timer loop
    ///
    /// The cycle's error, if any, is returned so the caller can report it
    /// and exit non-zero.
    pub async fn run_once(&self) -> Result<CycleReport> {
        info!("Running single update");
        let result = self.engine.run_cycle().await;
        log_cycle(&result);
        result
    }

    /// Run cycles until [`Scheduler::stop`] is called
    ///
    /// The first cycle runs immediately. Calling `start` on a scheduler that
    /// is already running or has been stopped is a logged no-op that returns
    /// `false`.
    pub async fn start(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                SchedulerState::Running => {
                    info!("DDNS scheduler is already running");
                    return false;
                }
                SchedulerState::Stopped => {
                    warn!("DDNS scheduler has been stopped and cannot be restarted");
                    return false;
                }
                SchedulerState::Idle => *state = SchedulerState::Running,
            }
        }

        info!(
            "Starting DDNS scheduler with {}s interval",
            self.interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,

                _ = ticker.tick() => {
                    // Runs to completion; cancellation is only observed between cycles
                    let result = self.engine.run_cycle().await;
                    log_cycle(&result);
                }
            }
        }

        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = SchedulerState::Stopped;
        info!("DDNS scheduler stopped");
        true
    }

    /// Stop the scheduler
    ///
    /// Cancels the pending timer. A cycle in progress completes first.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == SchedulerState::Stopped {
                return;
            }
            *state = SchedulerState::Stopped;
        }

        info!("Stopping DDNS scheduler...");
        self.shutdown.cancel();
    }

    /// Run cycles until SIGINT/SIGTERM or [`Scheduler::stop`]
    ///
    /// Returns at once if the scheduler is already running elsewhere or has
    /// been stopped.
    pub async fn run_until_signal(&self) {
        let run = self.start();
        tokio::pin!(run);

        tokio::select! {
            _ = &mut run => return,
            signal = wait_for_shutdown_signal() => match signal {
                Ok(name) => {
                    info!(signal = name, "Shutdown signal received");
                    self.stop();
                }
                Err(e) => error!("Signal handling unavailable: {}", e),
            },
        }

        // Let the in-flight cycle finish
        run.await;
    }
}

/// Log a cycle result at the scheduler boundary
fn log_cycle(result: &Result<CycleReport>) {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!("Update failed at {}: {}", chrono::Utc::now().to_rfc3339(), e);
            return;
        }
    };

    let at = report.checked_at.to_rfc3339();
    for outcome in &report.outcomes {
        match outcome.action {
            OutcomeAction::Updated | OutcomeAction::Created => info!(
                record = %outcome.record_name,
                "DNS updated successfully: {} → {} at {}",
                outcome.previous_ip.as_deref().unwrap_or("new"),
                outcome.current_ip,
                at
            ),
            OutcomeAction::Unchanged => info!(
                record = %outcome.record_name,
                "No update needed. IP remains: {} at {}",
                outcome.current_ip,
                at
            ),
            OutcomeAction::Failed => error!(
                record = %outcome.record_name,
                "Update failed at {}: {}",
                at,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    info!(
        records = report.outcomes.len(),
        updated = report.total_updated,
        failed = report.failed().count(),
        "Cycle finished"
    );
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("SIGINT")
}
