//! Transfer summary and reporting

use super::coordinator::TransferMode;
use std::time::Duration;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct TransferSummary {
    /// How the run delivered its data
    pub mode: TransferMode,

    /// Row count announced by the source header (not read in local-copy mode)
    pub total_rows: Option<f64>,

    /// Documents delivered to the destination
    pub documents: u64,

    /// Bulk requests issued
    pub batches: u64,

    /// Bytes written by a local copy
    pub bytes_written: u64,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl TransferSummary {
    /// Create an empty summary for `mode`
    pub fn new(mode: TransferMode) -> Self {
        Self {
            mode,
            total_rows: None,
            documents: 0,
            batches: 0,
            bytes_written: 0,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Documents per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.documents as f64 / secs
    }

    /// Log the summary
    pub fn log_summary(&self) {
        match self.mode {
            TransferMode::LocalCopy => {
                tracing::info!(
                    mode = %self.mode,
                    bytes_written = self.bytes_written,
                    duration_secs = self.duration.as_secs_f64(),
                    "Transfer completed"
                );
            }
            TransferMode::Bulk | TransferMode::Flatten => {
                tracing::info!(
                    mode = %self.mode,
                    total_rows = self.total_rows.unwrap_or_default(),
                    documents = self.documents,
                    batches = self.batches,
                    duration_secs = self.duration.as_secs_f64(),
                    docs_per_sec = format!("{:.1}", self.throughput()),
                    "Transfer completed"
                );
            }
        }
    }
}
