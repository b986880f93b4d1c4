//! Default metadata provider backed by the filesystem.

use super::{keys, read_exif, ExifSummary, MetadataMap, MetadataProvider, MetadataValue};
use crate::core::category::FileCategory;
use crate::core::scanner::FileRecord;
use crate::error::MetadataError;
use chrono::{DateTime, Local};

/// Reads stat attributes, sniffs content type with `infer`, and adds EXIF
/// fields for images. Extraction never fails; missing pieces are omitted.
///
/// Privacy filtering happens in the orchestrator, after extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMetadataProvider;

impl FsMetadataProvider {
    pub fn new() -> Self {
        Self
    }

    fn exif_for(file: &FileRecord) -> Option<ExifSummary> {
        if file.category() == FileCategory::Images {
            read_exif(&file.path)
        } else {
            None
        }
    }

    fn sniff_type(file: &FileRecord) -> Option<String> {
        match infer::get_from_path(&file.path) {
            Ok(Some(kind)) => Some(kind.mime_type().to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(file = %file.name, error = %e, "content sniffing failed");
                None
            }
        }
    }
}

impl MetadataProvider for FsMetadataProvider {
    fn extract(&self, file: &FileRecord) -> Result<MetadataMap, MetadataError> {
        let mut map = MetadataMap::new();
        let mut put = |key: &str, value: MetadataValue| {
            map.insert(key.to_string(), value);
        };

        put(keys::FILE_NAME, file.name.clone().into());
        put(keys::FILE_EXTENSION, file.extension.clone().into());
        put(keys::FILE_SIZE, MetadataValue::Integer(file.size as i64));
        if let Some(created) = file.created {
            put(keys::CREATED_DATE, created.into());
        }
        put(keys::MODIFIED_DATE, file.modified.into());
        put(keys::FILE_TYPE, file.category().kind().into());

        if let Some(mime) = Self::sniff_type(file) {
            put(keys::TYPE, mime.into());
        }

        let exif = Self::exif_for(file);
        if let Some(exif) = &exif {
            if let Some(taken) = exif.date_taken {
                put(keys::DATE_TAKEN, taken.into());
            }
            if let Some(camera) = exif.camera() {
                put(keys::CAMERA, camera.into());
            }
            if let Some(width) = exif.width {
                put(keys::WIDTH, MetadataValue::Integer(width.into()));
            }
            if let Some(height) = exif.height {
                put(keys::HEIGHT, MetadataValue::Integer(height.into()));
            }
            put(keys::HAS_LOCATION, exif.has_location().into());
            if let (Some(lat), Some(lon)) = (exif.latitude, exif.longitude) {
                put(keys::GPS_LATITUDE, lat.into());
                put(keys::GPS_LONGITUDE, lon.into());
            }
        }

        let date = exif
            .and_then(|e| e.date_taken)
            .unwrap_or(file.modified);
        put(keys::ORGANIZATION_DATE, date.into());

        Ok(map)
    }

    fn best_organization_date(&self, file: &FileRecord) -> Option<DateTime<Local>> {
        Self::exif_for(file)
            .and_then(|e| e.date_taken)
            .or(Some(file.modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Smallest PNG signature `infer` recognises
    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn record(dir: &TempDir, name: &str, content: &[u8]) -> FileRecord {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        FileRecord::from_path(&path).unwrap()
    }

    #[test]
    fn extract_reports_stat_fields() {
        let temp = TempDir::new().unwrap();
        let file = record(&temp, "notes.txt", b"hello");

        let map = FsMetadataProvider::new().extract(&file).unwrap();

        assert_eq!(map[keys::FILE_NAME], MetadataValue::from("notes.txt"));
        assert_eq!(map[keys::FILE_EXTENSION], MetadataValue::from("txt"));
        assert_eq!(map[keys::FILE_SIZE], MetadataValue::Integer(5));
        assert_eq!(map[keys::FILE_TYPE], MetadataValue::from("document"));
        assert_eq!(
            map[keys::MODIFIED_DATE],
            MetadataValue::Timestamp(file.modified)
        );
    }

    #[test]
    fn organization_date_defaults_to_modification_time() {
        let temp = TempDir::new().unwrap();
        let file = record(&temp, "photo.jpg", b"not really a jpeg");

        let provider = FsMetadataProvider::new();
        let map = provider.extract(&file).unwrap();

        assert_eq!(
            map[keys::ORGANIZATION_DATE],
            MetadataValue::Timestamp(file.modified)
        );
        assert_eq!(provider.best_organization_date(&file), Some(file.modified));
        assert!(!map.contains_key(keys::CAMERA));
    }

    #[test]
    fn content_type_is_sniffed() {
        let temp = TempDir::new().unwrap();
        let file = record(&temp, "mystery.bin", PNG_HEADER);

        let map = FsMetadataProvider::new().extract(&file).unwrap();

        assert_eq!(map[keys::TYPE], MetadataValue::from("image/png"));
        assert_eq!(map[keys::FILE_TYPE], MetadataValue::from("other"));
    }
}
