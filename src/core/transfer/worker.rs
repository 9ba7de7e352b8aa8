//! Delivery worker
//!
//! Consumes the transfer channel until the producer closes it. In bulk mode
//! documents are grouped into batches of `bulk_size` and flushed strictly in
//! order, one request at a time; in line mode each document is appended to
//! the output file as it arrives.

use crate::adapters::couchdb::BulkWriter;
use crate::adapters::file::LineWriter;
use crate::domain::{Document, Result};
use crate::log_batch_flushed;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Where delivered documents go
pub enum Delivery {
    /// Batched writes through a [`BulkWriter`]
    Bulk {
        /// Destination writer
        writer: Arc<dyn BulkWriter>,
        /// Documents per flush
        bulk_size: usize,
    },
    /// One JSON document per line in a local file
    Lines(LineWriter),
}

/// Counts reported by a worker that drained its channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Documents delivered
    pub documents: u64,
    /// Bulk requests issued (zero in line mode)
    pub batches: u64,
}

/// Consumer side of the transfer channel
pub struct DeliveryWorker {
    receiver: mpsc::Receiver<Document>,
    delivery: Delivery,
}

impl DeliveryWorker {
    /// Create a worker draining `receiver` into `delivery`
    pub fn new(receiver: mpsc::Receiver<Document>, delivery: Delivery) -> Self {
        Self { receiver, delivery }
    }

    /// Run the worker on its own task
    pub fn spawn(self) -> JoinHandle<Result<DeliveryReport>> {
        tokio::spawn(self.run())
    }

    /// Drain the channel, delivering every document.
    ///
    /// Returns once the channel is closed and the final partial batch (if
    /// any) is flushed. The first failed write ends the run and drops the
    /// receiver, which the producer observes as a closed channel.
    pub async fn run(self) -> Result<DeliveryReport> {
        let Self { receiver, delivery } = self;
        match delivery {
            Delivery::Bulk { writer, bulk_size } => run_bulk(receiver, writer, bulk_size).await,
            Delivery::Lines(writer) => run_lines(receiver, writer).await,
        }
    }
}

async fn run_bulk(
    mut receiver: mpsc::Receiver<Document>,
    writer: Arc<dyn BulkWriter>,
    bulk_size: usize,
) -> Result<DeliveryReport> {
    let bulk_size = bulk_size.max(1);
    let mut report = DeliveryReport::default();
    let mut batch: Vec<Document> = Vec::with_capacity(bulk_size);

    while let Some(doc) = receiver.recv().await {
        batch.push(doc);
        if batch.len() == bulk_size {
            flush(writer.as_ref(), &mut batch, &mut report).await?;
        }
    }

    if !batch.is_empty() {
        flush(writer.as_ref(), &mut batch, &mut report).await?;
    }

    tracing::debug!(
        destination = writer.destination(),
        documents = report.documents,
        batches = report.batches,
        "Delivery worker drained channel"
    );
    Ok(report)
}

async fn flush(
    writer: &dyn BulkWriter,
    batch: &mut Vec<Document>,
    report: &mut DeliveryReport,
) -> Result<()> {
    writer.write_bulk(batch).await?;

    report.batches += 1;
    report.documents += batch.len() as u64;
    log_batch_flushed!(report.batches, batch.len(), report.documents);

    batch.clear();
    Ok(())
}

async fn run_lines(
    mut receiver: mpsc::Receiver<Document>,
    mut writer: LineWriter,
) -> Result<DeliveryReport> {
    while let Some(doc) = receiver.recv().await {
        writer.write_document(&doc).await?;
    }

    let path = writer.path().display().to_string();
    let documents = writer.finish().await?;
    tracing::debug!(path = %path, documents, "Line writer finished");

    Ok(DeliveryReport {
        documents,
        batches: 0,
    })
}
