//! # Metadata Module
//!
//! Best-effort key/value metadata for files being organized.
//!
//! ## Providers
//! - [`MetadataProvider`] is the seam the orchestrator consumes
//! - [`FsMetadataProvider`] reads filesystem attributes, sniffs the content
//!   type, and pulls EXIF fields out of images
//!
//! ## Privacy
//! [`MetadataPolicy`] strips location and personal-identity keys according
//! to configuration before a resolver ever sees the map.

mod photo;
mod provider;

pub use photo::{read_exif, ExifSummary};
pub use provider::FsMetadataProvider;

use crate::config::{keys as config_keys, ConfigProvider};
use crate::core::scanner::FileRecord;
use crate::error::MetadataError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known metadata keys
pub mod keys {
    /// Preferred date for date-based placement
    pub const ORGANIZATION_DATE: &str = "organization_date";
    /// Content type reported by a provider (e.g. `image/jpeg`)
    pub const TYPE: &str = "type";
    /// Coarse kind: image, audio, video, document, other
    pub const FILE_TYPE: &str = "file_type";
    pub const FILE_NAME: &str = "file_name";
    pub const FILE_EXTENSION: &str = "file_extension";
    pub const FILE_SIZE: &str = "file_size";
    pub const CREATED_DATE: &str = "created_date";
    pub const MODIFIED_DATE: &str = "modified_date";
    pub const DATE_TAKEN: &str = "date_taken";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const CAMERA: &str = "camera";
    pub const GPS: &str = "gps";
    pub const LOCATION: &str = "location";
    pub const HAS_LOCATION: &str = "has_location";
    pub const GPS_LATITUDE: &str = "gps_latitude";
    pub const GPS_LONGITUDE: &str = "gps_longitude";
    pub const ARTIST: &str = "artist";
    pub const ALBUM: &str = "album";
    pub const AUTHOR: &str = "author";
    pub const CREATOR: &str = "creator";
    pub const OWNER: &str = "owner";
    pub const USER: &str = "user";
    pub const EDITOR: &str = "editor";
}

/// Keys whose presence marks a file as carrying rich metadata
const RICH_KEYS: &[&str] = &[
    keys::CAMERA,
    keys::HAS_LOCATION,
    keys::GPS,
    keys::ARTIST,
    keys::ALBUM,
    keys::AUTHOR,
    keys::CREATOR,
];

const LOCATION_KEYS: &[&str] = &[
    keys::GPS,
    keys::LOCATION,
    keys::HAS_LOCATION,
    keys::GPS_LATITUDE,
    keys::GPS_LONGITUDE,
];

const PERSONAL_KEYS: &[&str] = &[
    keys::AUTHOR,
    keys::CREATOR,
    keys::OWNER,
    keys::USER,
    keys::EDITOR,
];

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Local>),
}

impl MetadataValue {
    /// Empty text, zero and `false` count as absent
    pub fn is_truthy(&self) -> bool {
        match self {
            MetadataValue::Text(s) => !s.is_empty(),
            MetadataValue::Integer(n) => *n != 0,
            MetadataValue::Float(n) => *n != 0.0,
            MetadataValue::Bool(b) => *b,
            MetadataValue::Timestamp(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Local>> {
        match self {
            MetadataValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<DateTime<Local>> for MetadataValue {
    fn from(value: DateTime<Local>) -> Self {
        MetadataValue::Timestamp(value)
    }
}

/// Metadata keyed by name; keys are unique
pub type MetadataMap = BTreeMap<String, MetadataValue>;

/// Source of per-file metadata
pub trait MetadataProvider: Send + Sync {
    /// Collect whatever metadata is available for `file`
    fn extract(&self, file: &FileRecord) -> Result<MetadataMap, MetadataError>;

    /// Date to organize by, if one can be determined
    fn best_organization_date(&self, file: &FileRecord) -> Option<DateTime<Local>>;
}

/// Map used when a provider fails: only the modification time
pub fn fallback_metadata(file: &FileRecord) -> MetadataMap {
    let mut map = MetadataMap::new();
    map.insert(
        keys::MODIFIED_DATE.to_string(),
        MetadataValue::Timestamp(file.modified),
    );
    map
}

/// The organization date hint, if the map carries one
pub fn organization_date(metadata: &MetadataMap) -> Option<DateTime<Local>> {
    metadata
        .get(keys::ORGANIZATION_DATE)
        .and_then(MetadataValue::as_timestamp)
}

/// Whether any of camera, location, artist, album, author or creator is present
pub fn has_rich_metadata(metadata: &MetadataMap) -> bool {
    RICH_KEYS
        .iter()
        .any(|key| metadata.get(*key).is_some_and(MetadataValue::is_truthy))
}

/// Which sensitive keys survive extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataPolicy {
    pub keep_location: bool,
    pub keep_personal: bool,
}

impl MetadataPolicy {
    /// Keep everything
    pub fn permissive() -> Self {
        Self {
            keep_location: true,
            keep_personal: true,
        }
    }

    pub fn from_config(config: &dyn ConfigProvider) -> Self {
        Self {
            keep_location: config.get_bool(config_keys::EXTRACT_GPS_LOCATION, true),
            keep_personal: config.get_bool(config_keys::EXTRACT_PERSONAL_INFO, true),
        }
    }

    /// Remove the keys this policy does not allow
    pub fn apply(&self, metadata: &mut MetadataMap) {
        if !self.keep_location {
            for key in LOCATION_KEYS {
                metadata.remove(*key);
            }
        }
        if !self.keep_personal {
            for key in PERSONAL_KEYS {
                metadata.remove(*key);
            }
        }
    }
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}
