//! Transfer coordinator - main orchestrator for a copy run
//!
//! The coordinator owns the producer side of the pipeline: it decodes the
//! source, normalizes each document and enqueues it on the bounded transfer
//! channel. The delivery worker and the progress tracker run as background
//! tasks. Shutdown order is fixed: the producer closes the channel, the
//! tracker emits its final snapshot, then the coordinator waits for the
//! worker to drain and flush before returning.

use super::progress::{ProgressHandle, ProgressReporter, ProgressTracker};
use super::summary::TransferSummary;
use super::worker::{Delivery, DeliveryReport, DeliveryWorker};
use crate::adapters::couchdb::{BulkWriter, CouchDbBulkWriter};
use crate::adapters::file::{copy_stream_to_file, LineWriter};
use crate::adapters::http;
use crate::adapters::source::{open_source, SourceStream};
use crate::config::CopyConfig;
use crate::core::decode::RowDecoder;
use crate::core::transform::normalize;
use crate::domain::{Address, CopyError, Document, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How a run delivers its data, selected once from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Byte-for-byte copy of the source into a local file
    LocalCopy,
    /// Batched `_bulk_docs` writes to a remote database
    Bulk,
    /// One normalized document per line in a local file
    Flatten,
}

impl TransferMode {
    /// Select the mode for a destination
    pub fn select(flatten: bool, output: &Address) -> Self {
        if flatten {
            TransferMode::Flatten
        } else if output.is_url() {
            TransferMode::Bulk
        } else {
            TransferMode::LocalCopy
        }
    }

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMode::LocalCopy => "local_copy",
            TransferMode::Bulk => "bulk",
            TransferMode::Flatten => "flatten",
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the producer loop ended without a decode error
enum Produced {
    /// Every row was decoded and enqueued
    Completed(u64),
    /// The worker dropped its receiver, which only happens after a failed write
    ConsumerGone,
}

/// Transfer coordinator
pub struct TransferCoordinator {
    config: CopyConfig,
    reporter: Option<Arc<dyn ProgressReporter>>,
    bulk_writer: Option<Arc<dyn BulkWriter>>,
}

impl TransferCoordinator {
    /// Create a coordinator for one run
    pub fn new(config: CopyConfig) -> Self {
        Self {
            config,
            reporter: None,
            bulk_writer: None,
        }
    }

    /// Report progress snapshots to `reporter` (when progress is enabled)
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Use `writer` instead of a `_bulk_docs` writer built from the output address
    pub fn with_bulk_writer(mut self, writer: Arc<dyn BulkWriter>) -> Self {
        self.bulk_writer = Some(writer);
        self
    }

    /// Execute the transfer
    ///
    /// This method:
    /// 1. Validates the configuration (nothing is read on failure)
    /// 2. Selects the transfer mode
    /// 3. Opens the source stream
    /// 4. Either copies it verbatim, or decodes, normalizes and delivers it
    /// 5. Returns a summary once every document has been delivered
    ///
    /// # Errors
    ///
    /// Every error is fatal to the run and returned as is.
    pub async fn execute(&self) -> Result<TransferSummary> {
        let start_time = Instant::now();

        self.config.validate().map_err(CopyError::Configuration)?;
        let input = self
            .config
            .transfer
            .input_address()
            .map_err(CopyError::Configuration)?;
        let output = self
            .config
            .transfer
            .output_address()
            .map_err(CopyError::Configuration)?;
        let mode = TransferMode::select(self.config.transfer.flatten, &output);

        tracing::info!(
            source = %input,
            destination = %output,
            mode = %mode,
            bulk_size = self.config.transfer.bulk_size,
            "Starting transfer"
        );

        let client = http::source_client(&self.config.http)?;
        let mut source = open_source(&input, &client).await?;

        let summary = match mode {
            TransferMode::LocalCopy => self.local_copy(&mut source, &output).await?,
            TransferMode::Bulk | TransferMode::Flatten => {
                self.stream(source, &input, &output, mode).await?
            }
        };

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn local_copy(
        &self,
        source: &mut SourceStream,
        output: &Address,
    ) -> Result<TransferSummary> {
        let bytes = copy_stream_to_file(source, Path::new(output.as_str())).await?;
        tracing::info!(path = %output, "{bytes} bytes written");

        let mut summary = TransferSummary::new(TransferMode::LocalCopy);
        summary.bytes_written = bytes;
        Ok(summary)
    }

    async fn stream(
        &self,
        source: SourceStream,
        input: &Address,
        output: &Address,
        mode: TransferMode,
    ) -> Result<TransferSummary> {
        let mut decoder = RowDecoder::new(source);
        let total = decoder.begin().await?;
        tracing::info!(total_rows = total, "Source header decoded");

        let delivery = self.delivery(mode, output).await?;
        let (tx, rx) = mpsc::channel::<Document>(self.config.transfer.bulk_size);
        let worker = DeliveryWorker::new(rx, delivery).spawn();
        let progress = self.start_progress(total, input, output);

        let produced = produce(&mut decoder, &tx, progress.as_ref()).await;
        drop(tx);

        match produced {
            Ok(Produced::Completed(sent)) => {
                if let Some(progress) = progress {
                    progress.finish().await;
                }

                let report = join_worker(worker).await?;
                if (sent as f64) != total {
                    tracing::warn!(
                        total_rows = total,
                        decoded = sent,
                        "Source row count differs from the announced total_rows"
                    );
                }

                let mut summary = TransferSummary::new(mode);
                summary.total_rows = Some(total);
                summary.documents = report.documents;
                summary.batches = report.batches;
                Ok(summary)
            }
            Ok(Produced::ConsumerGone) => {
                if let Some(progress) = progress {
                    progress.cancel().await;
                }
                match join_worker(worker).await {
                    Err(e) => Err(e),
                    Ok(_) => Err(CopyError::Other(
                        "Delivery worker stopped before the source was exhausted".to_string(),
                    )),
                }
            }
            Err(e) => {
                worker.abort();
                if let Some(progress) = progress {
                    progress.cancel().await;
                }
                Err(e)
            }
        }
    }

    async fn delivery(&self, mode: TransferMode, output: &Address) -> Result<Delivery> {
        match mode {
            TransferMode::Flatten => Ok(Delivery::Lines(LineWriter::create(output.as_str()).await?)),
            _ => {
                let writer: Arc<dyn BulkWriter> = match &self.bulk_writer {
                    Some(writer) => writer.clone(),
                    None => {
                        let client = http::bulk_client(&self.config.http)?;
                        Arc::new(CouchDbBulkWriter::new(client, output)?)
                    }
                };
                Ok(Delivery::Bulk {
                    writer,
                    bulk_size: self.config.transfer.bulk_size,
                })
            }
        }
    }

    fn start_progress(
        &self,
        total: f64,
        input: &Address,
        output: &Address,
    ) -> Option<ProgressHandle> {
        if !self.config.progress.enabled {
            return None;
        }
        let reporter = self.reporter.clone()?;

        let tracker = ProgressTracker::new(
            total,
            input.redacted(),
            output.redacted(),
            Duration::from_millis(self.config.progress.interval_ms),
        );
        Some(tracker.spawn(reporter))
    }
}

/// Decode, normalize and enqueue every row.
///
/// `send` suspends while the channel is full, which is what throttles the
/// source to the destination's pace.
async fn produce<R>(
    decoder: &mut RowDecoder<R>,
    tx: &mpsc::Sender<Document>,
    progress: Option<&ProgressHandle>,
) -> Result<Produced>
where
    R: AsyncBufRead + Unpin,
{
    let mut sent = 0u64;
    while let Some(doc) = decoder.next().await? {
        if tx.send(normalize(doc)).await.is_err() {
            return Ok(Produced::ConsumerGone);
        }
        sent += 1;
        if let Some(progress) = progress {
            progress.processed();
        }
    }
    Ok(Produced::Completed(sent))
}

async fn join_worker(worker: JoinHandle<Result<DeliveryReport>>) -> Result<DeliveryReport> {
    worker
        .await
        .map_err(|e| CopyError::Other(format!("Delivery worker failed: {e}")))?
}
