//! Date layout: `<root>/<YYYY>/<MM>`.

use super::{check_file, date_folder, organization_date, place, DestinationResolver};
use crate::core::metadata::MetadataMap;
use crate::core::scanner::FileRecord;
use crate::core::validation::PathValidator;
use crate::error::OrganizerError;
use std::path::{Path, PathBuf};

/// Files by year and month of their organization date
#[derive(Debug, Clone)]
pub struct DateResolver {
    validator: PathValidator,
}

impl DateResolver {
    pub fn new(validator: PathValidator) -> Self {
        Self { validator }
    }
}

impl DestinationResolver for DateResolver {
    fn name(&self) -> &str {
        "date"
    }

    fn resolve(
        &self,
        file: &FileRecord,
        root: &Path,
        metadata: &MetadataMap,
    ) -> Result<PathBuf, OrganizerError> {
        check_file(&self.validator, file)?;
        let folder = date_folder(root, organization_date(file, metadata));
        place(&self.validator, &folder, file, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::keys;
    use crate::core::resolver::test_support::aged_file;
    use crate::error::SecurityError;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    #[test]
    fn uses_organization_date_hint() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = aged_file(source.path(), "beach.jpg", 0);

        let mut metadata = MetadataMap::new();
        let taken = Local.with_ymd_and_hms(2019, 8, 4, 10, 0, 0).unwrap();
        metadata.insert(keys::ORGANIZATION_DATE.to_string(), taken.into());

        let path = DateResolver::new(PathValidator::new())
            .resolve(&file, dest.path(), &metadata)
            .unwrap();

        assert_eq!(path, dest.path().join("2019/08/beach.jpg"));
    }

    #[test]
    fn falls_back_to_modification_time() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = aged_file(source.path(), "notes.txt", 0);

        let path = DateResolver::new(PathValidator::new())
            .resolve(&file, dest.path(), &MetadataMap::new())
            .unwrap();

        let expected = dest
            .path()
            .join(file.modified.format("%Y").to_string())
            .join(file.modified.format("%m").to_string())
            .join("notes.txt");
        assert_eq!(path, expected);
    }

    #[test]
    fn rejects_dangerous_extension() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = aged_file(source.path(), "setup.exe", 0);

        let result = DateResolver::new(PathValidator::new()).resolve(
            &file,
            dest.path(),
            &MetadataMap::new(),
        );

        assert!(matches!(
            result,
            Err(OrganizerError::Security(SecurityError::DangerousExtension { .. }))
        ));
    }
}
