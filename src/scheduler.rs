//! SchedulerActor - runs the monitoring cycle on a fixed interval
//!
//! The actor owns the [`MonitoringCycle`] and is the only task that runs it,
//! so two cycles never overlap.
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → MonitoringCycle::run_once → Publish CycleReport → [subscribers]
//!     ↑
//!     └─── Commands (RunNow, UpdateInterval, Shutdown)
//! ```
//!
//! A failed cycle is logged and skipped; the next tick starts a fresh cycle.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, instrument, trace, warn};

use crate::cycle::{CycleReport, MonitoringCycle};
use crate::error::MonitorResult;

/// Commands that can be sent to a SchedulerActor
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Run a cycle immediately (bypassing the interval timer)
    RunNow {
        respond_to: oneshot::Sender<MonitorResult<CycleReport>>,
    },

    /// Update the cycle interval
    UpdateInterval { interval_secs: u64 },

    /// Gracefully shut down; a cycle in progress is finished first
    Shutdown,
}

pub struct SchedulerActor {
    cycle: MonitoringCycle,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<SchedulerCommand>,

    /// Broadcast sender for reports of successful cycles
    report_tx: broadcast::Sender<CycleReport>,

    interval_duration: Duration,
}

impl SchedulerActor {
    pub fn new(
        cycle: MonitoringCycle,
        command_rx: mpsc::Receiver<SchedulerCommand>,
        report_tx: broadcast::Sender<CycleReport>,
    ) -> Self {
        let interval_duration = cycle.config().interval();

        Self {
            cycle,
            command_rx,
            report_tx,
            interval_duration,
        }
    }

    #[instrument(skip(self), fields(interval = ?self.interval_duration))]
    pub async fn run(mut self) {
        debug!("starting scheduler actor");

        let mut ticker = self.ticker();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("monitoring cycle failed: {e}");
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::RunNow { respond_to }) => {
                            debug!("received RunNow command");
                            let result = self.run_cycle().await;
                            let _ = respond_to.send(result);
                        }

                        Some(SchedulerCommand::UpdateInterval { interval_secs }) => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = Duration::from_secs(interval_secs.max(1));
                            ticker = self.ticker();
                        }

                        Some(SchedulerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("all handles dropped, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("scheduler actor stopped");
    }

    fn ticker(&self) -> tokio::time::Interval {
        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    async fn run_cycle(&self) -> MonitorResult<CycleReport> {
        let report = self.cycle.run_once().await?;

        match self.report_tx.send(report.clone()) {
            Ok(receivers) => trace!("published cycle report to {receivers} receivers"),
            Err(_) => trace!("no receivers for cycle report"),
        }

        Ok(report)
    }
}

/// Handle for controlling a SchedulerActor
#[derive(Clone)]
pub struct SchedulerHandle {
    sender: mpsc::Sender<SchedulerCommand>,
    report_tx: broadcast::Sender<CycleReport>,
}

impl SchedulerHandle {
    /// Spawn the scheduler; the first cycle starts immediately
    pub fn spawn(cycle: MonitoringCycle) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (report_tx, _) = broadcast::channel(16);

        let actor = SchedulerActor::new(cycle, cmd_rx, report_tx.clone());

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            report_tx,
        }
    }

    /// Receive reports of all subsequent successful cycles
    pub fn subscribe(&self) -> broadcast::Receiver<CycleReport> {
        self.report_tx.subscribe()
    }

    /// Run a cycle now and wait for its outcome
    pub async fn run_now(&self) -> Result<CycleReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SchedulerCommand::RunNow { respond_to: tx })
            .await
            .context("failed to send RunNow command")?;

        let report = rx.await.context("failed to receive response")??;
        Ok(report)
    }

    pub async fn update_interval(&self, interval_secs: u64) -> Result<()> {
        self.sender
            .send(SchedulerCommand::UpdateInterval { interval_secs })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(SchedulerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
