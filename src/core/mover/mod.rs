//! # Mover Module
//!
//! Physical file moves and copies.
//!
//! [`FileMover`] reports success as a plain `bool`; the orchestrator turns
//! `false` into a failed operation. Callers create parent directories.
//!
//! ## Safety
//! - An existing destination is never overwritten
//! - A move that cannot be done with a rename falls back to copy, size
//!   check, then removal of the source; the source survives any failure

use std::fs;
use std::io;
use std::path::Path;

/// Moves and copies single files
pub trait FileMover: Send + Sync {
    /// Move `source` to `destination`
    fn move_file(&self, source: &Path, destination: &Path) -> bool;

    /// Copy `source` to `destination`, leaving the source in place
    fn copy_file(&self, source: &Path, destination: &Path) -> bool;
}

/// [`FileMover`] over `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileMover;

impl FsFileMover {
    pub fn new() -> Self {
        Self
    }

    fn try_move(source: &Path, destination: &Path) -> io::Result<()> {
        refuse_existing(destination)?;
        // rename fails across filesystems, fall back to copy+delete
        fs::rename(source, destination).or_else(|_| {
            let source_size = fs::metadata(source)?.len();
            fs::copy(source, destination)?;

            let dest_size = fs::metadata(destination)?.len();
            if dest_size != source_size {
                let _ = fs::remove_file(destination);
                return Err(io::Error::other(format!(
                    "copy verification failed: source {} bytes, destination {} bytes",
                    source_size, dest_size
                )));
            }

            fs::remove_file(source)
        })
    }

    fn try_copy(source: &Path, destination: &Path) -> io::Result<()> {
        refuse_existing(destination)?;
        fs::copy(source, destination).map(|_| ())
    }
}

impl FileMover for FsFileMover {
    fn move_file(&self, source: &Path, destination: &Path) -> bool {
        match Self::try_move(source, destination) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "move failed");
                false
            }
        }
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> bool {
        match Self::try_copy(source, destination) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "copy failed");
                false
            }
        }
    }
}

fn refuse_existing(destination: &Path) -> io::Result<()> {
    if destination.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        ));
    }
    Ok(())
}
