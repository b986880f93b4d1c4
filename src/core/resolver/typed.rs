//! Type layout: `<root>/<Category>`.

use super::{categorize, check_file, place, DestinationResolver};
use crate::core::metadata::MetadataMap;
use crate::core::scanner::FileRecord;
use crate::core::validation::PathValidator;
use crate::error::OrganizerError;
use std::path::{Path, PathBuf};

/// Files by category folder (Images, Documents, ...)
#[derive(Debug, Clone)]
pub struct TypeResolver {
    validator: PathValidator,
}

impl TypeResolver {
    pub fn new(validator: PathValidator) -> Self {
        Self { validator }
    }
}

impl DestinationResolver for TypeResolver {
    fn name(&self) -> &str {
        "type"
    }

    fn resolve(
        &self,
        file: &FileRecord,
        root: &Path,
        metadata: &MetadataMap,
    ) -> Result<PathBuf, OrganizerError> {
        check_file(&self.validator, file)?;
        let folder = root.join(categorize(file, metadata).folder_name());
        place(&self.validator, &folder, file, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::keys;
    use crate::core::resolver::test_support::aged_file;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn resolve(file: &FileRecord, root: &Path, metadata: &MetadataMap) -> PathBuf {
        TypeResolver::new(PathValidator::new())
            .resolve(file, root, metadata)
            .unwrap()
    }

    #[test]
    fn known_extensions_map_to_category_folders() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let empty = MetadataMap::new();

        let cases = [
            ("photo.PNG", "Images"),
            ("report.pdf", "Documents"),
            ("clip.mp4", "Videos"),
            ("song.mp3", "Audio"),
            ("bundle.zip", "Archives"),
            ("main.rs", "Code"),
            ("data.xyz", "Other"),
        ];
        for (name, folder) in cases {
            let file = aged_file(source.path(), name, 0);
            assert_eq!(
                resolve(&file, dest.path(), &empty),
                dest.path().join(folder).join(name)
            );
        }
    }

    #[test]
    fn reported_type_is_used_for_unmapped_extensions() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = aged_file(source.path(), "voice.amr", 0);

        let mut metadata = MetadataMap::new();
        metadata.insert(keys::TYPE.to_string(), "audio/amr".into());

        assert_eq!(
            resolve(&file, dest.path(), &metadata),
            dest.path().join("Audio/voice.amr")
        );
    }

    #[test]
    fn same_name_resolves_to_distinct_paths() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = aged_file(source.path(), "scan.pdf", 0);
        let empty = MetadataMap::new();
        fs::create_dir_all(dest.path().join("Documents")).unwrap();

        let mut resolved = Vec::new();
        for _ in 0..4 {
            let path = resolve(&file, dest.path(), &empty);
            File::create(&path).unwrap();
            resolved.push(path);
        }

        let names: Vec<_> = resolved
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["scan.pdf", "scan_1.pdf", "scan_2.pdf", "scan_3.pdf"]);
    }
}
