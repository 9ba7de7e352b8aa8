//! Streaming transfer pipeline
//!
//! - [`coordinator`] - Drives a run: decode, normalize, enqueue, shut down in order
//! - [`worker`] - Drains the transfer channel into the destination
//! - [`progress`] - Background progress tracker with explicit shutdown
//! - [`summary`] - Run summary

pub mod coordinator;
pub mod progress;
pub mod summary;
pub mod worker;

pub use coordinator::{TransferCoordinator, TransferMode};
pub use progress::{ProgressHandle, ProgressReporter, ProgressSnapshot, ProgressTracker};
pub use summary::TransferSummary;
pub use worker::{Delivery, DeliveryReport, DeliveryWorker};
