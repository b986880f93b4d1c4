//! # Category Module
//!
//! Maps file extensions to the folder categories used by the type-aware
//! strategies.
//!
//! ## Categories
//! - Images, Documents, Videos, Audio, Archives, Code, Executables
//! - `Other` for anything unmapped

use serde::{Deserialize, Serialize};

/// Folder category for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileCategory {
    Images,
    Documents,
    Videos,
    Audio,
    Archives,
    Code,
    Executables,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "svg", "webp", "ico", "raw", "cr2", "nef",
    "orf", "dng",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx", "csv", "md", "tex",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp", "ogv",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "aiff", "au",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"];

const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "html", "css", "cpp", "c", "java", "php", "rb", "go", "rs", "swift", "kt", "ts",
];

const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "exe", "msi", "deb", "rpm", "dmg", "pkg", "app", "apk", "ipa",
];

impl FileCategory {
    /// Look up the category for an extension (with or without the dot, any case).
    ///
    /// Lookup order follows the table order, so an extension listed in two
    /// categories resolves to the first one.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_lowercase();
        let tables: [(FileCategory, &[&str]); 7] = [
            (FileCategory::Images, IMAGE_EXTENSIONS),
            (FileCategory::Documents, DOCUMENT_EXTENSIONS),
            (FileCategory::Videos, VIDEO_EXTENSIONS),
            (FileCategory::Audio, AUDIO_EXTENSIONS),
            (FileCategory::Archives, ARCHIVE_EXTENSIONS),
            (FileCategory::Code, CODE_EXTENSIONS),
            (FileCategory::Executables, EXECUTABLE_EXTENSIONS),
        ];

        tables
            .iter()
            .find(|(_, extensions)| extensions.contains(&ext.as_str()))
            .map(|(category, _)| *category)
            .unwrap_or(FileCategory::Other)
    }

    /// Guess a category from a reported type string such as `image/png`
    pub fn from_reported_type(reported: &str) -> Self {
        let reported = reported.to_lowercase();
        if reported.contains("image") {
            FileCategory::Images
        } else if reported.contains("video") {
            FileCategory::Videos
        } else if reported.contains("audio") {
            FileCategory::Audio
        } else if reported.contains("document") || reported.contains("text") {
            FileCategory::Documents
        } else {
            FileCategory::Other
        }
    }

    /// Folder name used in destination paths
    pub fn folder_name(&self) -> &'static str {
        match self {
            FileCategory::Images => "Images",
            FileCategory::Documents => "Documents",
            FileCategory::Videos => "Videos",
            FileCategory::Audio => "Audio",
            FileCategory::Archives => "Archives",
            FileCategory::Code => "Code",
            FileCategory::Executables => "Executables",
            FileCategory::Other => "Other",
        }
    }

    /// Coarse kind reported by metadata providers (`image`, `audio`, ...)
    pub fn kind(&self) -> &'static str {
        match self {
            FileCategory::Images => "image",
            FileCategory::Videos => "video",
            FileCategory::Audio => "audio",
            FileCategory::Documents => "document",
            _ => "other",
        }
    }

    /// Images, videos and audio
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            FileCategory::Images | FileCategory::Videos | FileCategory::Audio
        )
    }

    pub fn is_document(&self) -> bool {
        matches!(self, FileCategory::Documents)
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.folder_name())
    }
}
