//! Fixed-interval polling of homework statuses

use std::time::Duration;

use tokio::{sync::broadcast, time::sleep};
use tracing::{debug, error, info, instrument};

use super::{
    config::PollingConfig,
    error::ClientError,
    service::{CycleReport, CycleResult, HomeworkService},
};
use crate::cursor::PollCursor;

/// Polls the review API and relays status changes
///
/// Owns the cursor. Every cycle is followed by exactly one sleep of the
/// retry interval, whatever the cycle's outcome.
#[derive(Debug)]
pub struct HomeworkPoller {
    service: HomeworkService,
    cursor: PollCursor,
    config: PollingConfig,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl HomeworkPoller {
    /// Create a new poller starting from the current time
    pub fn new(service: HomeworkService, config: PollingConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Self {
            service,
            cursor: PollCursor::now(),
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start polling from `cursor` instead of the current time
    #[cfg(test)]
    pub fn with_cursor(mut self, cursor: PollCursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Poll until a shutdown signal arrives
    #[instrument(skip(self))]
    pub async fn start(mut self) {
        info!(
            retry_interval = ?self.config.retry_interval,
            cursor = %self.cursor,
            "Starting homework poller"
        );

        let fresh_rx = self.shutdown_tx.subscribe();
        let mut shutdown_rx = std::mem::replace(&mut self.shutdown_rx, fresh_rx);

        loop {
            tokio::select! {
                _ = self.tick() => {},
                _ = shutdown_rx.recv() => {
                    debug!("Poller received shutdown signal");
                    break;
                }
            }
        }

        info!(cursor = %self.cursor, "Homework poller stopped");
    }

    /// One cycle followed by the retry sleep
    ///
    /// `run_once` reports failures as values, so nothing between the cycle
    /// and the sleep can skip the sleep.
    pub async fn tick(&mut self) {
        let _ = self.run_once().await;
        sleep(self.config.retry_interval).await;
    }

    /// One cycle without sleeping
    ///
    /// The cursor only moves when the whole cycle succeeded.
    pub async fn run_once(&mut self) -> CycleResult {
        let outcome = self.service.run_cycle(self.cursor).await;

        match &outcome {
            Ok(report) => self.on_success(report),
            Err(error) => self.on_failure(error),
        }

        outcome
    }

    /// Get a shutdown sender for external shutdown control
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn cursor(&self) -> PollCursor {
        self.cursor
    }

    pub fn retry_interval(&self) -> Duration {
        self.config.retry_interval
    }

    fn on_success(&mut self, report: &CycleReport) {
        debug!(
            from = %self.cursor,
            to = %report.current_date,
            homework_count = report.homework_count,
            notified = report.message.is_some(),
            delivered = report.delivered,
            "Cycle completed"
        );
        self.cursor = report.current_date;
    }

    fn on_failure(&self, error: &ClientError) {
        error!(error = %error, cursor = %self.cursor, "Cycle failed");
    }
}
