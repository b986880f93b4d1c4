//! Flatten an organized tree back into one directory.

use super::{remove_empty_directories, BatchOrchestrator, BatchReport, BatchState};
use crate::core::progress::OperationKind;
use crate::core::scanner::{ensure_scannable, DirectoryWalk};
use crate::error::ScanError;
use crate::events::{Event, EventDispatcher, EventSender, WalkEvent};
use std::fs;
use std::path::{Path, PathBuf};

impl BatchOrchestrator {
    /// Move every file below `source` into `target`.
    ///
    /// Name collisions get an `_unorg_N` suffix. Unreadable subtrees are
    /// skipped and reported as [`WalkEvent::SubtreeSkipped`].
    pub fn unorganize(&self, source: &Path, target: &Path) -> Result<BatchReport, ScanError> {
        self.unorganize_dispatching(source, target, &self.dispatcher)
    }

    /// [`unorganize`](Self::unorganize), also sending every event to `events`
    pub fn unorganize_with_events(
        &self,
        source: &Path,
        target: &Path,
        events: &EventSender,
    ) -> Result<BatchReport, ScanError> {
        let dispatcher = self.dispatcher_with(events);
        self.unorganize_dispatching(source, target, &dispatcher)
    }

    fn unorganize_dispatching(
        &self,
        source: &Path,
        target: &Path,
        events: &EventDispatcher,
    ) -> Result<BatchReport, ScanError> {
        let (source, target) = match self.prepare_unorganize(source, target) {
            Ok(paths) => paths,
            Err(e) => {
                self.report_scan_failure(&e, events);
                return Err(e);
            }
        };

        let files = enumerate(&source, &target, events);
        let mut report = self.run_batch(
            OperationKind::Unorganize,
            &files,
            &target,
            &self.flat,
            events,
        );

        if self.remove_empty_source && report.state == BatchState::Completed {
            // Flattening in place leaves nothing of the root to protect
            let keep = (target != source).then_some(target.as_path());
            report.cleanup = Some(remove_empty_directories(
                &source,
                keep,
                &self.cleanup,
                events,
            ));
        }

        Ok(report)
    }

    fn prepare_unorganize(&self, source: &Path, target: &Path) -> Result<(PathBuf, PathBuf), ScanError> {
        let source = self.validator.sanitize_path(source)?;
        ensure_scannable(&source)?;

        let target = self.validator.sanitize_path(target)?;
        fs::create_dir_all(&target).map_err(|e| ScanError::CreateTarget {
            path: target.clone(),
            source: e,
        })?;

        Ok((source, target))
    }
}

/// All files below `source`, minus the target subtree and anything already
/// sitting directly in the target
fn enumerate(source: &Path, target: &Path, events: &EventDispatcher) -> Vec<PathBuf> {
    let mut walk = DirectoryWalk::new(source);
    if target != source && target.starts_with(source) {
        walk = walk.excluding(target);
    }

    let files: Vec<PathBuf> = walk
        .by_ref()
        .filter(|path| path.parent() != Some(target))
        .collect();

    let issues = walk.take_issues();
    for issue in &issues {
        tracing::warn!(kind = ?issue.kind, "skipped unreadable directory");
        events.dispatch(Event::Walk(WalkEvent::SubtreeSkipped(issue.clone())));
    }
    events.dispatch(Event::Walk(WalkEvent::Completed {
        files_found: files.len(),
        skipped: issues.len(),
    }));

    files
}
