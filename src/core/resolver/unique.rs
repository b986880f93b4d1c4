//! Collision-free file names.

use std::path::{Path, PathBuf};

/// First free path for `file_name` inside `folder`.
///
/// Returns `folder/file_name` when nothing is there, otherwise tries
/// `stem_1.ext`, `stem_2.ext`, ... (or `stem_<token>_1.ext` with a token)
/// until a name is unused. Existing entries, dangling links included, are
/// never reused.
pub fn unique_file_path(folder: &Path, file_name: &str, token: Option<&str>) -> PathBuf {
    let candidate = folder.join(file_name);
    if !is_occupied(&candidate) {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let new_name = match token {
            Some(token) => format!("{}_{}_{}{}", stem, token, counter, ext),
            None => format!("{}_{}{}", stem, counter, ext),
        };
        let new_path = folder.join(new_name);
        if !is_occupied(&new_path) {
            tracing::debug!(counter, "name collision resolved with suffix");
            return new_path;
        }
        counter += 1;
    }
}

fn is_occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn free_name_is_kept() {
        let temp = TempDir::new().unwrap();
        let path = unique_file_path(temp.path(), "photo.jpg", None);
        assert_eq!(path, temp.path().join("photo.jpg"));
    }

    #[test]
    fn collisions_get_increasing_suffixes() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("photo.jpg")).unwrap();
        File::create(temp.path().join("photo_1.jpg")).unwrap();

        let path = unique_file_path(temp.path(), "photo.jpg", None);
        assert_eq!(path, temp.path().join("photo_2.jpg"));
    }

    #[test]
    fn token_marks_the_suffix() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("notes.txt")).unwrap();

        let path = unique_file_path(temp.path(), "notes.txt", Some("unorg"));
        assert_eq!(path, temp.path().join("notes_unorg_1.txt"));
    }

    #[test]
    fn name_without_extension_gets_plain_suffix() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("Makefile")).unwrap();

        let path = unique_file_path(temp.path(), "Makefile", None);
        assert_eq!(path, temp.path().join("Makefile_1"));
    }

    #[test]
    fn only_last_extension_is_preserved() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("backup.tar.gz")).unwrap();

        let path = unique_file_path(temp.path(), "backup.tar.gz", None);
        assert_eq!(path, temp.path().join("backup.tar_1.gz"));
    }

    #[test]
    fn directories_count_as_occupied() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("report.pdf")).unwrap();

        let path = unique_file_path(temp.path(), "report.pdf", None);
        assert_eq!(path, temp.path().join("report_1.pdf"));
    }

    #[test]
    fn missing_folder_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("2024/05");
        assert_eq!(
            unique_file_path(&folder, "a.jpg", None),
            folder.join("a.jpg")
        );
    }
}
