//! Event type definitions for progress reporting.

use crate::core::progress::{OperationKind, OperationProgress, OperationResult};
use crate::core::scanner::WalkIssue;
use crate::error::ErrorCategory;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Batch lifecycle and per-file progress
    Batch(BatchEvent),
    /// Recursive enumeration for unorganize
    Walk(WalkEvent),
    /// Empty-directory removal after unorganize
    Cleanup(CleanupEvent),
}

/// Events for one organize or unorganize batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Files were discovered and processing is about to start
    Started {
        operation_id: String,
        operation: OperationKind,
        strategy: String,
        total_files: usize,
        destination: PathBuf,
    },
    /// A file finished (successfully or not)
    Progress(BatchProgress),
    /// A file failed; the batch continues
    FileError {
        file_name: String,
        error: String,
        category: ErrorCategory,
    },
    /// Metadata could not be read; a fallback was used
    MetadataFailed { file_name: String, error: String },
    /// Every file was attempted
    Completed(Box<BatchCompletion>),
    /// The batch could not start (scan-time only)
    Failed { error: String },
    /// Cancellation was requested between files
    Cancelled { processed: usize, total: usize },
}

/// Per-file progress update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
    pub percent: f64,
    pub current_file: String,
}

/// Final accounting for a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCompletion {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub summary: OperationProgress,
    pub failed_operations: Vec<OperationResult>,
}

/// Events during recursive enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalkEvent {
    /// A subtree could not be read and was skipped
    SubtreeSkipped(WalkIssue),
    /// Enumeration finished
    Completed { files_found: usize, skipped: usize },
}

/// Events while removing emptied directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CleanupEvent {
    Started { root: PathBuf },
    DirectoryRemoved { path: PathBuf },
    /// Removal still failed after the last retry
    RemovalFailed {
        path: PathBuf,
        attempts: u32,
        error: String,
    },
    Completed { removed: usize, failed: usize },
}
