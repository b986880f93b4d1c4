//! # Progress Module
//!
//! Per-file results and batch accounting.
//!
//! [`ProgressTracker`] is append-only: every [`OperationResult`] bumps the
//! processed counter and exactly one of successful/failed, so
//! `processed == successful + failed` always holds. The total is fixed when
//! the tracker is created. [`OperationProgress`] is the read-only snapshot
//! handed to callers.

use crate::error::{ErrorCategory, OrganizerError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What was done to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Move,
    Copy,
    Organize,
    Unorganize,
}

impl OperationKind {
    /// Organize and unorganize keep full paths for traceability
    fn keeps_paths(&self) -> bool {
        matches!(self, OperationKind::Organize | OperationKind::Unorganize)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Move => write!(f, "move"),
            OperationKind::Copy => write!(f, "copy"),
            OperationKind::Organize => write!(f, "organize"),
            OperationKind::Unorganize => write!(f, "unorganize"),
        }
    }
}

/// Outcome of one file operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    /// Source file name (no directories)
    pub source_file: String,
    pub operation: OperationKind,
    pub success: bool,
    /// Destination file name (no directories)
    pub destination_file: Option<String>,
    pub error: Option<String>,
    pub error_category: Option<ErrorCategory>,
    pub duration: Duration,
    pub file_size: u64,
    /// Full paths, kept in memory only
    #[serde(skip)]
    source_path: Option<PathBuf>,
    #[serde(skip)]
    destination_path: Option<PathBuf>,
}

impl OperationResult {
    pub fn succeeded(
        operation: OperationKind,
        source: &Path,
        destination: &Path,
        file_size: u64,
        duration: Duration,
    ) -> Self {
        let keep = operation.keeps_paths();
        Self {
            source_file: file_name(source),
            operation,
            success: true,
            destination_file: Some(file_name(destination)),
            error: None,
            error_category: None,
            duration,
            file_size,
            source_path: keep.then(|| source.to_path_buf()),
            destination_path: keep.then(|| destination.to_path_buf()),
        }
    }

    pub fn failed(
        operation: OperationKind,
        source: &Path,
        error: &OrganizerError,
        file_size: u64,
        duration: Duration,
    ) -> Self {
        Self {
            source_file: file_name(source),
            operation,
            success: false,
            destination_file: None,
            error: Some(error.to_string()),
            error_category: Some(error.category()),
            duration,
            file_size,
            source_path: operation.keeps_paths().then(|| source.to_path_buf()),
            destination_path: None,
        }
    }

    /// Full source path (organize/unorganize only)
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Full destination path of a successful organize/unorganize
    pub fn destination_path(&self) -> Option<&Path> {
        self.destination_path.as_deref()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Accumulates results for one batch
#[derive(Debug)]
pub struct ProgressTracker {
    operation_id: String,
    total_files: usize,
    processed_files: usize,
    successful_files: usize,
    failed_files: usize,
    started_at: DateTime<Local>,
    started: Instant,
    current_file: Option<String>,
    results: Vec<OperationResult>,
    total_duration: Duration,
}

impl ProgressTracker {
    pub fn new(operation_id: impl Into<String>, total_files: usize) -> Self {
        Self {
            operation_id: operation_id.into(),
            total_files,
            processed_files: 0,
            successful_files: 0,
            failed_files: 0,
            started_at: Local::now(),
            started: Instant::now(),
            current_file: None,
            results: Vec::new(),
            total_duration: Duration::ZERO,
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn processed_files(&self) -> usize {
        self.processed_files
    }

    pub fn successful_files(&self) -> usize {
        self.successful_files
    }

    pub fn failed_files(&self) -> usize {
        self.failed_files
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Name of the file being worked on
    pub fn set_current_file(&mut self, name: impl Into<String>) {
        self.current_file = Some(name.into());
    }

    /// Record one finished operation
    pub fn add_result(&mut self, result: OperationResult) {
        self.processed_files += 1;
        if result.success {
            self.successful_files += 1;
        } else {
            self.failed_files += 1;
        }
        self.total_duration += result.duration;
        self.results.push(result);
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    /// Failed results in the order they happened
    pub fn failed_operations(&self) -> Vec<&OperationResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }

    /// 100.0 for an empty batch
    pub fn completion_percentage(&self) -> f64 {
        if self.total_files == 0 {
            100.0
        } else {
            self.processed_files as f64 / self.total_files as f64 * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn files_per_second(&self) -> f64 {
        let seconds = self.elapsed().as_secs_f64();
        if seconds > 0.0 {
            self.processed_files as f64 / seconds
        } else {
            0.0
        }
    }

    /// Mean per-file processing time
    pub fn average_processing_time(&self) -> Duration {
        match u32::try_from(self.processed_files) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_duration / n,
            Err(_) => Duration::from_secs_f64(
                self.total_duration.as_secs_f64() / self.processed_files as f64,
            ),
        }
    }

    /// Remaining files times the mean processing time
    pub fn estimated_remaining(&self) -> Duration {
        let remaining = self.total_files.saturating_sub(self.processed_files);
        let average = self.average_processing_time();
        match u32::try_from(remaining) {
            Ok(n) => average.saturating_mul(n),
            Err(_) => average.mul_f64(remaining as f64),
        }
    }

    /// Read-only copy of the current state
    pub fn snapshot(&self) -> OperationProgress {
        OperationProgress {
            operation_id: self.operation_id.clone(),
            total_files: self.total_files,
            processed_files: self.processed_files,
            successful_files: self.successful_files,
            failed_files: self.failed_files,
            started_at: self.started_at,
            current_file: self.current_file.clone(),
            completion_percentage: self.completion_percentage(),
            elapsed: self.elapsed(),
            files_per_second: self.files_per_second(),
            average_processing_time: self.average_processing_time(),
            estimated_remaining: self.estimated_remaining(),
            results: self.results.clone(),
        }
    }
}

/// Snapshot of a batch's progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationProgress {
    pub operation_id: String,
    pub total_files: usize,
    pub processed_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub started_at: DateTime<Local>,
    pub current_file: Option<String>,
    pub completion_percentage: f64,
    pub elapsed: Duration,
    pub files_per_second: f64,
    pub average_processing_time: Duration,
    pub estimated_remaining: Duration,
    pub results: Vec<OperationResult>,
}

impl OperationProgress {
    pub fn failed_operations(&self) -> Vec<&OperationResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }

    /// Sum of sizes of successfully processed files
    pub fn bytes_processed(&self) -> u64 {
        self.results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.file_size)
            .sum()
    }
}
