//! Progress tracking
//!
//! The tracker runs on its own task. The producer sends one "processed"
//! signal per document handed to the transfer channel over an unbounded
//! channel, so signalling never stalls the decode loop. A fixed interval
//! emits snapshots to a [`ProgressReporter`]; missed ticks are skipped.
//!
//! Shutdown is explicit: [`ProgressHandle::finish`] emits one final snapshot
//! with `processed` forced to `total`, [`ProgressHandle::cancel`] stops the
//! task without reporting.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Point-in-time view of a run's progress
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Source address (redacted)
    pub source: String,
    /// Destination address (redacted)
    pub destination: String,
    /// Row count announced by the source
    pub total: f64,
    /// Documents handed off so far
    pub processed: f64,
}

impl ProgressSnapshot {
    /// Completion percentage. An empty source counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total <= 0.0 {
            return 100.0;
        }
        (self.processed / self.total * 100.0).min(100.0)
    }
}

/// Receives progress snapshots
pub trait ProgressReporter: Send + Sync {
    /// Called on every tick and once at completion
    fn report(&self, snapshot: &ProgressSnapshot);
}

/// Configures a progress tracker for one run
pub struct ProgressTracker {
    snapshot: ProgressSnapshot,
    interval: Duration,
}

impl ProgressTracker {
    /// Create a tracker for `total` rows
    pub fn new(
        total: f64,
        source: impl Into<String>,
        destination: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            snapshot: ProgressSnapshot {
                source: source.into(),
                destination: destination.into(),
                total,
                processed: 0.0,
            },
            interval,
        }
    }

    /// Start the tracker task
    pub fn spawn(self, reporter: Arc<dyn ProgressReporter>) -> ProgressHandle {
        let (processed_tx, processed_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = oneshot::channel();

        let task = tokio::spawn(track(
            self.snapshot,
            self.interval,
            reporter,
            processed_rx,
            finished_rx,
        ));

        ProgressHandle {
            processed_tx,
            finished_tx: Some(finished_tx),
            task,
        }
    }
}

/// Producer-side handle to a running tracker
pub struct ProgressHandle {
    processed_tx: mpsc::UnboundedSender<()>,
    finished_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<ProgressSnapshot>,
}

impl ProgressHandle {
    /// Record one processed document. Never blocks.
    pub fn processed(&self) {
        // Tracker gone means nobody is watching; progress is advisory
        let _ = self.processed_tx.send(());
    }

    /// Emit the final snapshot and wait for the tracker to stop.
    ///
    /// Returns the snapshot reported last, with `processed == total`.
    pub async fn finish(mut self) -> ProgressSnapshot {
        if let Some(finished_tx) = self.finished_tx.take() {
            let _ = finished_tx.send(());
        }
        match self.task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Progress tracker task failed");
                ProgressSnapshot {
                    source: String::new(),
                    destination: String::new(),
                    total: 0.0,
                    processed: 0.0,
                }
            }
        }
    }

    /// Stop the tracker without a final report
    pub async fn cancel(mut self) {
        // Dropping the sender without sending wakes the tracker with an error
        self.finished_tx.take();
        let _ = self.task.await;
    }
}

async fn track(
    mut snapshot: ProgressSnapshot,
    period: Duration,
    reporter: Arc<dyn ProgressReporter>,
    mut processed_rx: mpsc::UnboundedReceiver<()>,
    mut finished_rx: oneshot::Receiver<()>,
) -> ProgressSnapshot {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut signals_closed = false;

    loop {
        tokio::select! {
            biased;

            finished = &mut finished_rx => {
                if finished.is_ok() {
                    snapshot.processed = snapshot.total;
                    reporter.report(&snapshot);
                    tracing::debug!(total = snapshot.total, "Progress tracker finished");
                } else {
                    tracing::debug!(processed = snapshot.processed, "Progress tracker cancelled");
                }
                return snapshot;
            }

            signal = processed_rx.recv(), if !signals_closed => {
                match signal {
                    // An understated total_rows must not push the count past it
                    Some(()) => snapshot.processed = (snapshot.processed + 1.0).min(snapshot.total),
                    None => signals_closed = true,
                }
            }

            _ = ticker.tick() => {
                reporter.report(&snapshot);
            }
        }
    }
}
