//! Per-file pipeline and batch loop.

use super::{BatchOrchestrator, BatchReport, BatchState, TransferMode};
use crate::core::metadata::{fallback_metadata, keys, MetadataMap, MetadataValue};
use crate::core::progress::{OperationKind, OperationResult, ProgressTracker};
use crate::core::resolver::DestinationResolver;
use crate::core::scanner::FileRecord;
use crate::error::{InputError, OrganizerError, TransferError};
use crate::events::{BatchCompletion, BatchEvent, BatchProgress, Event, EventDispatcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// A file that reached its destination
struct Placed {
    destination: PathBuf,
    size: u64,
}

/// A file that did not, with whatever size was known
struct Failure {
    error: OrganizerError,
    size: u64,
}

/// `organize_1a2b3c4d`
fn operation_id(kind: OperationKind) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}_{}", kind, &id[..8])
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl BatchOrchestrator {
    pub(super) fn run_batch(
        &self,
        kind: OperationKind,
        files: &[PathBuf],
        destination: &Path,
        resolver: &dyn DestinationResolver,
        events: &EventDispatcher,
    ) -> BatchReport {
        let operation_id = operation_id(kind);
        let mut tracker = ProgressTracker::new(operation_id.clone(), files.len());
        let mut state = BatchState::Scanning;

        tracing::info!(
            operation = %operation_id,
            strategy = resolver.name(),
            total = files.len(),
            "batch started"
        );
        events.dispatch(Event::Batch(BatchEvent::Started {
            operation_id: operation_id.clone(),
            operation: kind,
            strategy: resolver.name().to_string(),
            total_files: files.len(),
            destination: destination.to_path_buf(),
        }));

        for (index, path) in files.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                state = state.advance(BatchState::Cancelled);
                break;
            }
            state = state.advance(BatchState::Processing { index });

            let name = display_name(path);
            tracker.set_current_file(name.clone());

            let started = Instant::now();
            let result = match self.process_file(path, destination, resolver, events) {
                Ok(placed) => OperationResult::succeeded(
                    kind,
                    path,
                    &placed.destination,
                    placed.size,
                    started.elapsed(),
                ),
                Err(failure) => {
                    let category = failure.error.category();
                    tracing::warn!(file = %name, %category, "file not processed");
                    tracing::debug!(file = %name, error = %failure.error, "failure detail");
                    events.dispatch(Event::Batch(BatchEvent::FileError {
                        file_name: name.clone(),
                        error: failure.error.to_string(),
                        category,
                    }));
                    OperationResult::failed(kind, path, &failure.error, failure.size, started.elapsed())
                }
            };
            tracker.add_result(result);

            events.dispatch(Event::Batch(BatchEvent::Progress(BatchProgress {
                processed: tracker.processed_files(),
                total: tracker.total_files(),
                percent: tracker.completion_percentage(),
                current_file: name,
            })));
        }

        let progress = tracker.snapshot();
        if state == BatchState::Cancelled {
            tracing::info!(
                operation = %operation_id,
                processed = progress.processed_files,
                total = progress.total_files,
                "batch cancelled"
            );
            events.dispatch(Event::Batch(BatchEvent::Cancelled {
                processed: progress.processed_files,
                total: progress.total_files,
            }));
        } else {
            state = state.advance(BatchState::Completed);
            tracing::info!(
                operation = %operation_id,
                successful = progress.successful_files,
                failed = progress.failed_files,
                "batch completed"
            );
            events.dispatch(Event::Batch(BatchEvent::Completed(Box::new(
                BatchCompletion {
                    processed: progress.processed_files,
                    successful: progress.successful_files,
                    failed: progress.failed_files,
                    failed_operations: progress.failed_operations().into_iter().cloned().collect(),
                    summary: progress.clone(),
                },
            ))));
        }

        BatchReport {
            operation_id,
            operation: kind,
            strategy: resolver.name().to_string(),
            state,
            progress,
            cleanup: None,
        }
    }

    fn process_file(
        &self,
        path: &Path,
        destination: &Path,
        resolver: &dyn DestinationResolver,
        events: &EventDispatcher,
    ) -> Result<Placed, Failure> {
        let mut record = FileRecord::from_path(path).map_err(|e| Failure {
            error: e.into(),
            size: 0,
        })?;
        let size = record.size;
        let fail = |error: OrganizerError| Failure { error, size };

        if destination.as_os_str().is_empty() {
            return Err(fail(InputError::EmptyDestination.into()));
        }

        let source = self
            .validator
            .sanitize_path(path)
            .map_err(|e| fail(e.into()))?;
        self.validator
            .check_extension(&record.extension)
            .map_err(|e| fail(e.into()))?;

        record.metadata = self.collect_metadata(&record, events);

        let target = resolver
            .resolve(&record, destination, &record.metadata)
            .map_err(fail)?;

        self.ensure_parent(&target).map_err(fail)?;

        let transferred = match self.mode {
            TransferMode::Move => self.mover.move_file(&source, &target),
            TransferMode::Copy => self.mover.copy_file(&source, &target),
        };
        if !transferred {
            let error = match self.mode {
                TransferMode::Move => TransferError::MoveFailed {
                    from: source,
                    to: target,
                },
                TransferMode::Copy => TransferError::CopyFailed {
                    from: source,
                    to: target,
                },
            };
            return Err(fail(error.into()));
        }

        Ok(Placed {
            destination: target,
            size,
        })
    }

    /// Provider metadata with the date hint filled in and the privacy policy
    /// applied. A provider failure degrades to the modification time only.
    fn collect_metadata(&self, record: &FileRecord, events: &EventDispatcher) -> MetadataMap {
        let mut metadata = match self.metadata.extract(record) {
            Ok(mut metadata) => {
                if !metadata.contains_key(keys::ORGANIZATION_DATE) {
                    if let Some(date) = self.metadata.best_organization_date(record) {
                        metadata.insert(
                            keys::ORGANIZATION_DATE.to_string(),
                            MetadataValue::Timestamp(date),
                        );
                    }
                }
                metadata
            }
            Err(e) => {
                tracing::warn!(file = %record.name, "metadata extraction failed, using modification time");
                events.dispatch(Event::Batch(BatchEvent::MetadataFailed {
                    file_name: record.name.clone(),
                    error: e.to_string(),
                }));
                fallback_metadata(record)
            }
        };

        self.policy.apply(&mut metadata);
        metadata
    }

    fn ensure_parent(&self, target: &Path) -> Result<(), OrganizerError> {
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        let parent = self.validator.sanitize_path(parent)?;
        fs::create_dir_all(&parent).map_err(|source| TransferError::CreateDirectory {
            path: parent.clone(),
            source,
        })?;
        Ok(())
    }
}
