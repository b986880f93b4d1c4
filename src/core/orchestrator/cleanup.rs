//! Removal of directories emptied by unorganize.

use crate::error::TransferError;
use crate::events::{CleanupEvent, Event, EventDispatcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use walkdir::WalkDir;

/// How hard to try before giving up on a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

/// A directory that could not be removed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub attempts: u32,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

/// Remove every empty directory below `root`, deepest first.
///
/// `root` itself and the `keep` subtree are left alone. Directories that
/// still hold anything are skipped silently.
pub fn remove_empty_directories(
    root: &Path,
    keep: Option<&Path>,
    policy: &CleanupPolicy,
    events: &EventDispatcher,
) -> CleanupReport {
    events.dispatch(Event::Cleanup(CleanupEvent::Started {
        root: root.to_path_buf(),
    }));

    let mut report = CleanupReport::default();
    let directories = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| keep.map_or(true, |keep| !entry.path().starts_with(keep)));

    for entry in directories {
        let path = entry.path();
        if !is_empty_dir(path) {
            continue;
        }

        match remove_with_retries(path, policy) {
            Ok(()) => {
                tracing::debug!("removed empty directory");
                events.dispatch(Event::Cleanup(CleanupEvent::DirectoryRemoved {
                    path: path.to_path_buf(),
                }));
                report.removed.push(path.to_path_buf());
            }
            Err(error) => {
                tracing::warn!(attempts = policy.attempts, "could not remove empty directory");
                let failure = CleanupFailure {
                    path: path.to_path_buf(),
                    attempts: policy.attempts,
                    error: error.to_string(),
                };
                events.dispatch(Event::Cleanup(CleanupEvent::RemovalFailed {
                    path: failure.path.clone(),
                    attempts: failure.attempts,
                    error: failure.error.clone(),
                }));
                report.failures.push(failure);
            }
        }
    }

    events.dispatch(Event::Cleanup(CleanupEvent::Completed {
        removed: report.removed.len(),
        failed: report.failures.len(),
    }));
    report
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

fn remove_with_retries(path: &Path, policy: &CleanupPolicy) -> Result<(), TransferError> {
    let attempts = policy.attempts.max(1);
    let mut last_error: Option<io::Error> = None;

    for attempt in 1..=attempts {
        match fs::remove_dir(path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                tracing::debug!(attempt, error = %e, "directory removal failed");
                last_error = Some(e);
                if attempt < attempts {
                    thread::sleep(policy.delay);
                }
            }
        }
    }

    Err(TransferError::RemoveDirectory {
        path: path.to_path_buf(),
        attempts,
        reason: last_error.map(|e| e.to_string()).unwrap_or_default(),
    })
}
