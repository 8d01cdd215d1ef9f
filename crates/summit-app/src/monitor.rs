use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use summit_ports::types::SweepReport;

use crate::error::AppError;

pub const DEFAULT_SWEEP_INTERVAL_MINUTES: u64 = 5;

/// One full escalation pass. Implemented by the escalation service; the
/// indirection lets tests drive sweeps without a timer.
#[async_trait]
pub trait SweepRunner: Send + Sync {
    async fn run_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError>;
}

/// The driver loop: sleep for the configured interval, run one sweep,
/// repeat until shutdown. Sweeps never overlap within a process because
/// the loop awaits each sweep before sleeping again.
pub struct EscalationMonitor<S>
where
    S: SweepRunner + 'static,
{
    runner: Arc<S>,
    interval: Duration,
}

impl<S> EscalationMonitor<S>
where
    S: SweepRunner + 'static,
{
    pub fn new(runner: Arc<S>, interval_minutes: u64) -> Self {
        Self {
            runner,
            interval: Duration::from_secs(interval_minutes * 60),
        }
    }

    /// Sub-minute intervals for tests.
    pub fn with_interval(runner: Arc<S>, interval: Duration) -> Self {
        Self { runner, interval }
    }

    pub fn spawn(self) -> MonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "escalation monitor started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("escalation monitor stopping");
                        break;
                    }
                    _ = tokio::time::sleep(self.interval) => {
                        match self.runner.run_sweep(Utc::now()).await {
                            Ok(report) => {
                                info!(
                                    checked = report.checked,
                                    escalated = report.escalated,
                                    "sweep finished"
                                );
                            }
                            Err(err) => {
                                // The next tick retries; nothing here is fatal.
                                error!(error = %err, "sweep failed");
                            }
                        }
                    }
                }
            }
        });
        MonitorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingRunner {
        sweeps: AtomicU32,
    }

    #[async_trait]
    impl SweepRunner for CountingRunner {
        async fn run_sweep(&self, _now: DateTime<Utc>) -> Result<SweepReport, AppError> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            Ok(SweepReport {
                checked: 0,
                escalated: 0,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_runs_one_sweep_per_interval() {
        let runner = Arc::new(CountingRunner::default());
        let monitor =
            EscalationMonitor::with_interval(Arc::clone(&runner), Duration::from_secs(60));
        let handle = monitor.spawn();

        tokio::time::sleep(Duration::from_secs(60 * 3 + 1)).await;
        handle.shutdown().await;

        assert_eq!(runner.sweeps.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_first_tick_runs_no_sweep() {
        let runner = Arc::new(CountingRunner::default());
        let monitor =
            EscalationMonitor::with_interval(Arc::clone(&runner), Duration::from_secs(300));
        let handle = monitor.spawn();

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.shutdown().await;

        assert_eq!(runner.sweeps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_sweep_does_not_stop_the_loop() {
        struct FailingRunner {
            sweeps: AtomicU32,
        }

        #[async_trait]
        impl SweepRunner for FailingRunner {
            async fn run_sweep(&self, _now: DateTime<Utc>) -> Result<SweepReport, AppError> {
                self.sweeps.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Port(summit_ports::error::PortError::Connection(
                    "db down".into(),
                )))
            }
        }

        let runner = Arc::new(FailingRunner {
            sweeps: AtomicU32::new(0),
        });
        let monitor =
            EscalationMonitor::with_interval(Arc::clone(&runner), Duration::from_secs(60));
        let handle = monitor.spawn();

        tokio::time::sleep(Duration::from_secs(60 * 2 + 1)).await;
        handle.shutdown().await;

        assert_eq!(runner.sweeps.load(Ordering::SeqCst), 2);
    }
}
