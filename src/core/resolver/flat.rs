//! Flat layout for unorganize: every file directly in the target.

use super::{check_file, place, DestinationResolver};
use crate::core::metadata::MetadataMap;
use crate::core::scanner::FileRecord;
use crate::core::validation::PathValidator;
use crate::error::OrganizerError;
use std::path::{Path, PathBuf};

/// Suffix token that marks names renamed during unorganize (`name_unorg_1.ext`)
pub const UNORGANIZE_TOKEN: &str = "unorg";

#[derive(Debug, Clone)]
pub struct FlatResolver {
    validator: PathValidator,
}

impl FlatResolver {
    pub fn new(validator: PathValidator) -> Self {
        Self { validator }
    }
}

impl DestinationResolver for FlatResolver {
    fn name(&self) -> &str {
        "flat"
    }

    fn resolve(
        &self,
        file: &FileRecord,
        root: &Path,
        _metadata: &MetadataMap,
    ) -> Result<PathBuf, OrganizerError> {
        check_file(&self.validator, file)?;
        place(&self.validator, root, file, Some(UNORGANIZE_TOKEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::test_support::aged_file;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn collisions_use_unorganize_token() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::create_dir(source.path().join("2024")).unwrap();
        let file = aged_file(&source.path().join("2024"), "photo.jpg", 0);
        File::create(target.path().join("photo.jpg")).unwrap();

        let path = FlatResolver::new(PathValidator::new())
            .resolve(&file, target.path(), &MetadataMap::new())
            .unwrap();

        assert_eq!(path, target.path().join("photo_unorg_1.jpg"));
    }

    #[test]
    fn free_name_lands_directly_in_target() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let file = aged_file(source.path(), "song.mp3", 0);

        let path = FlatResolver::new(PathValidator::new())
            .resolve(&file, target.path(), &MetadataMap::new())
            .unwrap();

        assert_eq!(path, target.path().join("song.mp3"));
    }
}
