//! Lazy recursive directory walk using walkdir.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Why part of a tree could not be walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkIssueKind {
    PermissionDenied,
    Unreadable,
}

/// A subtree that was skipped during the walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkIssue {
    pub path: PathBuf,
    pub kind: WalkIssueKind,
    pub message: String,
}

impl WalkIssue {
    fn from_walkdir(root: &Path, error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let kind = if error.io_error().map(|e| e.kind()) == Some(ErrorKind::PermissionDenied) {
            WalkIssueKind::PermissionDenied
        } else {
            WalkIssueKind::Unreadable
        };

        Self {
            path,
            kind,
            message: error.to_string(),
        }
    }
}

type EntryIter = Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + Send>;

/// Yields every file below a root, in file-name order per directory.
///
/// Unreadable directories are skipped and recorded as [`WalkIssue`]s, which
/// callers collect with [`take_issues`](Self::take_issues). Symbolic links
/// are yielded as-is, never followed, so the validator can reject them.
pub struct DirectoryWalk {
    root: PathBuf,
    excluded: Option<PathBuf>,
    entries: EntryIter,
    issues: Vec<WalkIssue>,
}

impl DirectoryWalk {
    /// Start a walk at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let entries = Self::entries(&root, None);
        Self {
            root,
            excluded: None,
            entries,
            issues: Vec::new(),
        }
    }

    /// Do not descend into `subtree` (e.g. a flat target inside the source)
    pub fn excluding(mut self, subtree: impl Into<PathBuf>) -> Self {
        self.excluded = Some(subtree.into());
        self.restart();
        self
    }

    /// Rewind to the beginning of the tree, forgetting recorded issues
    pub fn restart(&mut self) {
        self.entries = Self::entries(&self.root, self.excluded.clone());
        self.issues.clear();
    }

    /// Issues recorded so far
    pub fn issues(&self) -> &[WalkIssue] {
        &self.issues
    }

    /// Drain the recorded issues
    pub fn take_issues(&mut self) -> Vec<WalkIssue> {
        std::mem::take(&mut self.issues)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries(root: &Path, excluded: Option<PathBuf>) -> EntryIter {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| match &excluded {
                Some(skip) => entry.path() != skip.as_path(),
                None => true,
            });
        Box::new(walker)
    }
}

impl Iterator for DirectoryWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.entries.next()? {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_file() || file_type.is_symlink() {
                        return Some(entry.into_path());
                    }
                }
                Err(error) => {
                    let issue = WalkIssue::from_walkdir(&self.root, error);
                    tracing::debug!(kind = ?issue.kind, "skipping unreadable subtree");
                    self.issues.push(issue);
                }
            }
        }
    }
}
