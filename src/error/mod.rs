//! # Error Module
//!
//! Error types for the file organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file isolation** - only [`ScanError`] is fatal to a batch
//! - **Redactable** - messages carry raw paths; redaction happens in the
//!   presentation layer (see `core::redact`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Security check failed: {0}")]
    Security(#[from] SecurityError),

    #[error("File operation failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl OrganizerError {
    /// Coarse classification used when recording a failed operation
    pub fn category(&self) -> ErrorCategory {
        match self {
            OrganizerError::Scan(_) => ErrorCategory::Scan,
            OrganizerError::Input(_) => ErrorCategory::Input,
            OrganizerError::Security(_) => ErrorCategory::Security,
            OrganizerError::Transfer(_) => ErrorCategory::Io,
            OrganizerError::Metadata(_) => ErrorCategory::Metadata,
            OrganizerError::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Error taxonomy as seen by consumers of batch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Input,
    Security,
    Io,
    Metadata,
    Scan,
    Config,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Security => write!(f, "security"),
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Metadata => write!(f, "metadata"),
            ErrorCategory::Scan => write!(f, "scan"),
            ErrorCategory::Config => write!(f, "config"),
        }
    }
}

/// Errors that abort a batch before any file is touched
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsafe directory rejected: {0}")]
    Rejected(#[from] SecurityError),

    #[error("Failed to create target directory {path}: {source}")]
    CreateTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file input problems
#[derive(Error, Debug)]
pub enum InputError {
    #[error("File does not exist: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Destination root cannot be empty")]
    EmptyDestination,

    #[error("File name is not valid UTF-8: {path}")]
    NonUtf8Name { path: PathBuf },

    #[error("Failed to read file information for {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejections raised by the path validator and the resolvers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    #[error("Dangerous or invalid file extension: {extension}")]
    DangerousExtension { extension: String },

    #[error("Unsafe file name: {name}")]
    InvalidFilename { name: String },

    #[error("Path contains a null byte")]
    NullByte,

    #[error("Path traversal segment in: {path}")]
    PathTraversal { path: PathBuf },

    #[error("Path is {length} characters long (limit {limit})")]
    PathTooLong { length: usize, limit: usize },

    #[error("Symbolic link in path: {path}")]
    SymlinkInPath { path: PathBuf },

    #[error("Access to system directory not allowed: {path}")]
    SystemDirectory { path: PathBuf },

    #[error("No existing parent directory for: {path}")]
    NoExistingAncestor { path: PathBuf },

    #[error("Nearest existing ancestor of {path} is not a directory")]
    AncestorNotDirectory { path: PathBuf },

    #[error("Path is neither a regular file nor a directory: {path}")]
    UnsupportedFileType { path: PathBuf },

    #[error("Could not determine the working directory: {reason}")]
    WorkingDirectory { reason: String },
}

/// Errors from physical moves, copies and directory creation
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Failed to move {from} to {to}")]
    MoveFailed { from: PathBuf, to: PathBuf },

    #[error("Failed to copy {from} to {to}")]
    CopyFailed { from: PathBuf, to: PathBuf },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove directory {path} after {attempts} attempts: {reason}")]
    RemoveDirectory {
        path: PathBuf,
        attempts: u32,
        reason: String,
    },
}

/// Metadata extraction failures. Always downgraded to a fallback.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read metadata for {path}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },
}

/// Configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Unknown organization strategy: {name}")]
    UnknownStrategy { name: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;
