//! # Scanner Module
//!
//! Discovers the files a batch will process.
//!
//! - [`scan_top_level`] lists the regular files directly inside a source
//!   directory (the organize input)
//! - [`DirectoryWalk`] lazily walks a whole tree (the unorganize input),
//!   reporting unreadable subtrees on a side channel instead of failing
//!
//! ## Example
//! ```rust,ignore
//! use file_organizer::core::scanner::{scan_top_level, FileRecord};
//!
//! for path in scan_top_level(Path::new("/Users/me/Downloads"))? {
//!     let record = FileRecord::from_path(&path)?;
//!     println!("{} ({} bytes)", record.name, record.size);
//! }
//! ```

mod walker;

pub use walker::{DirectoryWalk, WalkIssue, WalkIssueKind};

use crate::core::category::FileCategory;
use crate::core::metadata::MetadataMap;
use crate::error::{InputError, ScanError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A file as seen by the organizer during one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File name including extension
    pub name: String,
    /// Lower-cased extension without the dot (empty if none)
    pub extension: String,
    /// File size in bytes
    pub size: u64,
    /// Creation time, where the platform reports one
    pub created: Option<DateTime<Local>>,
    /// Last modification time (current time if unavailable)
    pub modified: DateTime<Local>,
    /// Last access time, where the platform reports one
    pub accessed: Option<DateTime<Local>>,
    /// Metadata attached by the orchestrator
    pub metadata: MetadataMap,
}

impl FileRecord {
    /// Read a file's attributes. The path must name an existing regular file.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let attributes = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => InputError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => InputError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if !attributes.is_file() {
            return Err(InputError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        // Names are carried as strings through resolution, so a lossy
        // conversion would move the file under a different name.
        let name = match path.file_name().map(|n| n.to_str()) {
            Some(Some(name)) => name.to_string(),
            Some(None) => {
                return Err(InputError::NonUtf8Name {
                    path: path.to_path_buf(),
                })
            }
            None => String::new(),
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            extension,
            size: attributes.len(),
            created: attributes.created().ok().map(DateTime::<Local>::from),
            modified: attributes
                .modified()
                .map(DateTime::<Local>::from)
                .unwrap_or_else(|_| Local::now()),
            accessed: attributes.accessed().ok().map(DateTime::<Local>::from),
            metadata: MetadataMap::new(),
        })
    }

    /// Category from the extension table
    pub fn category(&self) -> FileCategory {
        FileCategory::from_extension(&self.extension)
    }

    /// Attach metadata to the record
    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }
}

/// List the regular files directly inside `dir`, sorted by name.
///
/// Fails when the directory itself cannot be read; that is the only
/// batch-fatal error in the organize flow.
pub fn scan_top_level(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|e| read_error(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| read_error(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Make sure `dir` exists, is a directory, and can be listed
pub fn ensure_scannable(dir: &Path) -> Result<(), ScanError> {
    match fs::metadata(dir) {
        Ok(m) if m.is_dir() => {}
        Ok(_) => {
            return Err(ScanError::NotADirectory {
                path: dir.to_path_buf(),
            })
        }
        Err(e) => return Err(read_error(dir, e)),
    }
    fs::read_dir(dir).map_err(|e| read_error(dir, e))?;
    Ok(())
}

fn read_error(dir: &Path, error: std::io::Error) -> ScanError {
    match error.kind() {
        ErrorKind::NotFound => ScanError::DirectoryNotFound {
            path: dir.to_path_buf(),
        },
        ErrorKind::PermissionDenied => ScanError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ if dir.is_file() => ScanError::NotADirectory {
            path: dir.to_path_buf(),
        },
        _ => ScanError::ReadDirectory {
            path: dir.to_path_buf(),
            source: error,
        },
    }
}
