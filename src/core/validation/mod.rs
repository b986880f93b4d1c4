//! # Validation Module
//!
//! Security checks that run before any filesystem mutation.
//!
//! ## Checks
//! - **Paths** - null bytes, `..` segments, length, symbolic links,
//!   operating-system directories, existing-ancestor rules
//! - **File names** - reserved characters, control characters, Unicode
//!   normalization spoofing, reserved device names, length
//! - **Extensions** - executable/installer denylist, length, charset
//!
//! Every check is a pure predicate. Rejections come back as
//! [`SecurityError`] values; nothing here panics or touches the disk
//! beyond reading metadata.

use crate::error::SecurityError;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Longest accepted absolute path, in characters
pub const MAX_PATH_LENGTH: usize = 4096;

/// Longest accepted file name, in characters
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Longest accepted extension, in characters (without the dot)
pub const MAX_EXTENSION_LENGTH: usize = 10;

/// Operating-system directories no organizer may read from or write into.
///
/// Compared case-insensitively with `/` as the separator, on component
/// boundaries.
const SYSTEM_DIRECTORIES: &[&str] = &[
    // macOS
    "/system",
    "/usr/bin",
    "/usr/sbin",
    "/bin",
    "/sbin",
    "/etc",
    "/var/log",
    "/private/etc",
    "/private/var/log",
    // Windows
    "c:/windows",
    "c:/program files",
    "c:/program files (x86)",
    "c:/programdata",
    "c:/system volume information",
    // Linux
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/run",
];

/// Executable and installer extensions that are never organized
const DANGEROUS_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "pif", "scr", "vbs", "js", "jar", "app", "deb", "pkg", "dmg",
    "rpm", "run", "msi", "dll", "so",
];

const FORBIDDEN_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\0', '/', '\\'];

const RESERVED_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitizes and authorizes paths, file names and extensions.
///
/// Cheap to clone; the orchestrator and every resolver hold their own copy.
#[derive(Debug, Clone)]
pub struct PathValidator {
    max_path_length: usize,
    denied_directories: Vec<String>,
}

impl PathValidator {
    /// Create a validator with the built-in system-directory denylist
    pub fn new() -> Self {
        Self {
            max_path_length: MAX_PATH_LENGTH,
            denied_directories: SYSTEM_DIRECTORIES.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Deny an additional directory tree
    pub fn with_denied_directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.denied_directories
            .push(normalize_for_comparison(directory.as_ref()));
        self
    }

    /// Turn untrusted input into an absolute, symlink-free, authorized path.
    ///
    /// Empty input resolves to the current working directory.
    pub fn sanitize_path(&self, input: impl AsRef<Path>) -> Result<PathBuf, SecurityError> {
        let input = input.as_ref();

        if input.as_os_str().is_empty() {
            return env::current_dir().map_err(|e| SecurityError::WorkingDirectory {
                reason: e.to_string(),
            });
        }

        if input.as_os_str().as_encoded_bytes().contains(&0) {
            return Err(SecurityError::NullByte);
        }

        if input.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(SecurityError::PathTraversal {
                path: input.to_path_buf(),
            });
        }

        let absolute = absolutize(input)?;

        let length = absolute.to_string_lossy().chars().count();
        if length > self.max_path_length {
            return Err(SecurityError::PathTooLong {
                length,
                limit: self.max_path_length,
            });
        }

        reject_symlinks(&absolute)?;

        if self.is_denied_directory(&absolute) {
            return Err(SecurityError::SystemDirectory { path: absolute });
        }

        check_existing_ancestry(&absolute)?;

        Ok(absolute)
    }

    /// Check that `path` is a safe, existing directory
    pub fn validate_directory(&self, path: impl AsRef<Path>) -> bool {
        match self.sanitize_path(path) {
            Ok(safe) => safe.is_dir(),
            Err(_) => false,
        }
    }

    /// Check a single file name (no separators) for spoofing and reserved names
    pub fn validate_filename(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }

        if name.chars().any(|c| FORBIDDEN_FILENAME_CHARS.contains(&c)) {
            return false;
        }

        if name.chars().any(|c| (c as u32) < 32) {
            return false;
        }

        if name.nfkc().collect::<String>() != name {
            return false;
        }

        let upper = name.to_uppercase();
        if RESERVED_DEVICE_NAMES.contains(&upper.as_str()) {
            return false;
        }

        name.chars().count() <= MAX_FILENAME_LENGTH
    }

    /// Check an extension, with or without its leading dot
    pub fn validate_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_lowercase();

        if ext.is_empty() {
            return false;
        }

        if DANGEROUS_EXTENSIONS.contains(&ext.as_str()) {
            return false;
        }

        if ext.chars().count() > MAX_EXTENSION_LENGTH {
            return false;
        }

        ext.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// [`validate_extension`](Self::validate_extension) as a `Result`
    pub fn check_extension(&self, extension: &str) -> Result<(), SecurityError> {
        if self.validate_extension(extension) {
            Ok(())
        } else {
            Err(SecurityError::DangerousExtension {
                extension: extension.to_string(),
            })
        }
    }

    /// [`validate_filename`](Self::validate_filename) as a `Result`
    pub fn check_filename(&self, name: &str) -> Result<(), SecurityError> {
        if self.validate_filename(name) {
            Ok(())
        } else {
            Err(SecurityError::InvalidFilename {
                name: name.to_string(),
            })
        }
    }

    fn is_denied_directory(&self, path: &Path) -> bool {
        let normalized = normalize_for_comparison(path);
        self.denied_directories.iter().any(|denied| {
            normalized == *denied
                || normalized
                    .strip_prefix(denied.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

impl Default for PathValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-case, forward-slash form used for denylist matching
fn normalize_for_comparison(path: &Path) -> String {
    let lowered = path.to_string_lossy().to_lowercase().replace('\\', "/");
    match lowered.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
        _ => lowered,
    }
}

/// Make a path absolute without following links, dropping `.` components
fn absolutize(path: &Path) -> Result<PathBuf, SecurityError> {
    let mut absolute = if path.is_absolute() {
        PathBuf::new()
    } else {
        env::current_dir().map_err(|e| SecurityError::WorkingDirectory {
            reason: e.to_string(),
        })?
    };

    for component in path.components() {
        match component {
            Component::CurDir => {}
            other => absolute.push(other.as_os_str()),
        }
    }

    Ok(absolute)
}

/// Reject the path if it, or any existing ancestor, is a symbolic link
fn reject_symlinks(path: &Path) -> Result<(), SecurityError> {
    for ancestor in path.ancestors() {
        if let Ok(metadata) = fs::symlink_metadata(ancestor) {
            if metadata.file_type().is_symlink() {
                return Err(SecurityError::SymlinkInPath {
                    path: ancestor.to_path_buf(),
                });
            }
        }
    }
    Ok(())
}

/// Existing paths must be files or directories; new paths must hang below
/// an existing directory.
fn check_existing_ancestry(path: &Path) -> Result<(), SecurityError> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        return if metadata.is_file() || metadata.is_dir() {
            Ok(())
        } else {
            Err(SecurityError::UnsupportedFileType {
                path: path.to_path_buf(),
            })
        };
    }

    let mut current = path.parent();
    while let Some(ancestor) = current {
        if let Ok(metadata) = fs::metadata(ancestor) {
            if !metadata.is_dir() {
                return Err(SecurityError::AncestorNotDirectory {
                    path: path.to_path_buf(),
                });
            }
            if path.starts_with(ancestor) && path != ancestor {
                return Ok(());
            }
            break;
        }
        current = ancestor.parent();
    }

    Err(SecurityError::NoExistingAncestor {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn validator() -> PathValidator {
        PathValidator::new()
    }

    #[test]
    fn empty_input_resolves_to_working_directory() {
        let path = validator().sanitize_path("").unwrap();
        assert_eq!(path, env::current_dir().unwrap());
    }

    #[test]
    fn parent_segments_are_rejected() {
        let temp = TempDir::new().unwrap();
        let sneaky = temp.path().join("photos").join("..").join("..").join("etc");
        let result = validator().sanitize_path(&sneaky);
        assert!(matches!(result, Err(SecurityError::PathTraversal { .. })));

        assert!(validator().sanitize_path("../outside").is_err());
        assert!(validator().sanitize_path("a/b/../../c").is_err());
    }

    #[test]
    fn null_bytes_are_rejected() {
        let result = validator().sanitize_path("/tmp/evil\0.txt");
        assert_eq!(result, Err(SecurityError::NullByte));
    }

    #[test]
    fn system_directories_are_rejected() {
        for path in ["/etc", "/etc/passwd", "/usr/bin/ls", "/proc/self", "/BOOT/grub"] {
            assert!(
                validator().sanitize_path(path).is_err(),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn denylist_matches_whole_components_only() {
        let validator = validator();
        assert!(validator.is_denied_directory(Path::new("/etc")));
        assert!(validator.is_denied_directory(Path::new("/etc/hosts")));
        assert!(validator.is_denied_directory(Path::new("C:\\Windows\\System32")));
        assert!(!validator.is_denied_directory(Path::new("/etcetera/notes")));
        assert!(!validator.is_denied_directory(Path::new("/binaries")));
        assert!(!validator.is_denied_directory(Path::new("/var/tmp")));
    }

    #[test]
    fn custom_denied_directory_is_honoured() {
        let temp = TempDir::new().unwrap();
        let validator = validator().with_denied_directory(temp.path());
        let result = validator.sanitize_path(temp.path().join("inside.txt"));
        assert!(matches!(result, Err(SecurityError::SystemDirectory { .. })));
    }

    #[test]
    fn overly_long_paths_are_rejected() {
        let long = format!("/tmp/{}", "a/".repeat(2100));
        let result = validator().sanitize_path(&long);
        assert!(matches!(result, Err(SecurityError::PathTooLong { .. })));
    }

    #[test]
    fn existing_file_and_directory_are_accepted() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("photo.jpg");
        File::create(&file).unwrap();

        assert_eq!(validator().sanitize_path(&file).unwrap(), file);
        assert_eq!(validator().sanitize_path(temp.path()).unwrap(), temp.path());
    }

    #[test]
    fn current_dir_components_are_dropped() {
        let temp = TempDir::new().unwrap();
        let dotted = temp.path().join(".").join("new.txt");
        let clean = validator().sanitize_path(&dotted).unwrap();
        assert_eq!(clean, temp.path().join("new.txt"));
    }

    #[test]
    fn nonexistent_path_below_directory_is_accepted() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("2024").join("01").join("photo.jpg");
        assert_eq!(validator().sanitize_path(&target).unwrap(), target);
    }

    #[test]
    fn nonexistent_path_below_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        File::create(&file).unwrap();

        let result = validator().sanitize_path(file.join("child.txt"));
        assert!(matches!(
            result,
            Err(SecurityError::AncestorNotDirectory { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_target_is_rejected() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real.txt");
        File::create(&real).unwrap();
        let link = temp.path().join("link.txt");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let result = validator().sanitize_path(&link);
        assert!(matches!(result, Err(SecurityError::SymlinkInPath { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_parent_is_rejected_even_for_new_paths() {
        let temp = TempDir::new().unwrap();
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).unwrap();
        let linked_dir = temp.path().join("linked");
        std::os::unix::fs::symlink(&real_dir, &linked_dir).unwrap();

        let result = validator().sanitize_path(linked_dir.join("not-yet.txt"));
        assert!(matches!(result, Err(SecurityError::SymlinkInPath { .. })));
    }

    #[test]
    fn validate_directory_requires_existing_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        File::create(&file).unwrap();

        assert!(validator().validate_directory(temp.path()));
        assert!(!validator().validate_directory(&file));
        assert!(!validator().validate_directory(temp.path().join("missing")));
        assert!(!validator().validate_directory("/etc"));
    }

    #[test]
    fn reserved_device_names_are_rejected_in_any_case() {
        for name in ["CON", "con", "Prn", "aux", "NUL", "com1", "COM9", "lpt1", "Lpt9"] {
            assert!(!validator().validate_filename(name), "{} accepted", name);
        }
    }

    #[test]
    fn ordinary_names_are_accepted() {
        for name in ["photo.jpg", "Quarterly Report (final).pdf", "café.txt", "CONSOLE.log"] {
            assert!(validator().validate_filename(name), "{} rejected", name);
        }
        assert!(validator().validate_filename(&"a".repeat(MAX_FILENAME_LENGTH)));
    }

    #[test]
    fn dangerous_characters_are_rejected() {
        for name in ["a<b", "a>b", "a:b", "a\"b", "a|b", "a?b", "a*b", "a/b", "a\\b", "a\0b"] {
            assert!(!validator().validate_filename(name), "{:?} accepted", name);
        }
        assert!(!validator().validate_filename("tab\there"));
        assert!(!validator().validate_filename(""));
    }

    #[test]
    fn unstable_normalization_is_rejected() {
        // U+FB01 LATIN SMALL LIGATURE FI
        assert!(!validator().validate_filename("\u{FB01}le.txt"));
        // e + COMBINING ACUTE ACCENT composes under NFKC
        assert!(!validator().validate_filename("cafe\u{301}.txt"));
        // FULLWIDTH LATIN CAPITAL LETTER A
        assert!(!validator().validate_filename("\u{FF21}.txt"));
    }

    #[test]
    fn long_names_are_rejected() {
        assert!(!validator().validate_filename(&"a".repeat(MAX_FILENAME_LENGTH + 1)));
    }

    #[test]
    fn dangerous_extensions_are_rejected() {
        for ext in ["exe", ".exe", "EXE", ".Msi", "dll", "so", "js", "jar"] {
            assert!(!validator().validate_extension(ext), "{} accepted", ext);
        }
    }

    #[test]
    fn safe_extensions_are_accepted() {
        for ext in ["jpg", ".JPG", "pdf", ".mp4", "tar", "7z"] {
            assert!(validator().validate_extension(ext), "{} rejected", ext);
        }
    }

    #[test]
    fn malformed_extensions_are_rejected() {
        assert!(!validator().validate_extension(""));
        assert!(!validator().validate_extension("."));
        assert!(!validator().validate_extension("abcdefghijk"));
        assert!(!validator().validate_extension("tar.gz"));
        assert!(!validator().validate_extension("j-pg"));
    }

    #[test]
    fn check_extension_rejects_missing_extension() {
        assert_eq!(
            validator().check_extension(""),
            Err(SecurityError::DangerousExtension {
                extension: String::new()
            })
        );
        assert!(validator().check_extension("txt").is_ok());
        assert_eq!(
            validator().check_extension("exe"),
            Err(SecurityError::DangerousExtension {
                extension: "exe".to_string()
            })
        );
    }
}
