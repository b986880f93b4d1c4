//! # Resolver Module
//!
//! Decides where each file belongs inside a destination root.
//!
//! ## Strategies
//! - **Date**: `<root>/<YYYY>/<MM>`
//! - **Type**: `<root>/<Category>`
//! - **Smart**: picks a layout per file (see [`StrategyDecision`])
//! - **Flat**: everything directly in the root, used by unorganize
//!
//! Every resolver follows the same contract: reject dangerous extensions
//! and unsafe names, compute a folder, pick a free name in it, then run the
//! final path through the [`PathValidator`]. A returned path never names an
//! existing file at the moment it is returned.
//!
//! Callers can plug in their own resolvers through [`ResolverRegistry`].

mod date;
mod flat;
mod smart;
mod typed;
mod unique;

pub use date::DateResolver;
pub use flat::{FlatResolver, UNORGANIZE_TOKEN};
pub use smart::{SmartResolver, StrategyDecision};
pub use typed::TypeResolver;
pub use unique::unique_file_path;

use crate::config::{keys as config_keys, ConfigProvider};
use crate::core::category::FileCategory;
use crate::core::metadata::{self, keys, MetadataMap, MetadataValue};
use crate::core::scanner::FileRecord;
use crate::core::validation::PathValidator;
use crate::error::{ConfigError, OrganizerError};
use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Computes the destination for one file
pub trait DestinationResolver: Send + Sync {
    /// Name shown in events and reports
    fn name(&self) -> &str;

    /// Full destination path for `file` below `root`
    fn resolve(
        &self,
        file: &FileRecord,
        root: &Path,
        metadata: &MetadataMap,
    ) -> Result<PathBuf, OrganizerError>;
}

/// Strategy selection, resolved once when a batch is configured
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Date,
    Type,
    #[default]
    Smart,
    /// A resolver registered under this name
    Custom(String),
}

impl Strategy {
    /// Built-in names are matched case-insensitively; anything else is custom
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "date" => Strategy::Date,
            "type" => Strategy::Type,
            "smart" => Strategy::Smart,
            _ => Strategy::Custom(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Strategy::Date => "date",
            Strategy::Type => "type",
            Strategy::Smart => "smart",
            Strategy::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Caller-supplied resolvers, looked up by name
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    custom: HashMap<String, Arc<dyn DestinationResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a resolver under `name`
    pub fn register(&mut self, name: impl Into<String>, resolver: Arc<dyn DestinationResolver>) {
        self.custom.insert(name.into(), resolver);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Names of registered resolvers, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Turn a strategy into a resolver
    pub fn build(
        &self,
        strategy: &Strategy,
        validator: &PathValidator,
        config: &dyn ConfigProvider,
    ) -> Result<Arc<dyn DestinationResolver>, ConfigError> {
        let resolver: Arc<dyn DestinationResolver> = match strategy {
            Strategy::Date => Arc::new(DateResolver::new(validator.clone())),
            Strategy::Type => Arc::new(TypeResolver::new(validator.clone())),
            Strategy::Smart => {
                let days = config.get_u64(config_keys::RECENT_DAYS_THRESHOLD, 30);
                Arc::new(
                    SmartResolver::new(validator.clone())
                        .with_recent_days(i64::try_from(days).unwrap_or(i64::MAX)),
                )
            }
            Strategy::Custom(name) => {
                self.custom
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownStrategy { name: name.clone() })?
            }
        };
        Ok(resolver)
    }
}

/// Step one of every resolver: extension and file-name checks
pub(crate) fn check_file(validator: &PathValidator, file: &FileRecord) -> Result<(), OrganizerError> {
    validator.check_extension(&file.extension)?;
    validator.check_filename(&file.name)?;
    Ok(())
}

/// Pick a free name in `folder` and validate the result
pub(crate) fn place(
    validator: &PathValidator,
    folder: &Path,
    file: &FileRecord,
    token: Option<&str>,
) -> Result<PathBuf, OrganizerError> {
    let candidate = unique_file_path(folder, &file.name, token);
    Ok(validator.sanitize_path(candidate)?)
}

/// The organization date hint, else the modification time
pub(crate) fn organization_date(file: &FileRecord, metadata: &MetadataMap) -> DateTime<Local> {
    metadata::organization_date(metadata).unwrap_or(file.modified)
}

/// `<root>/<YYYY>/<MM>` in local time
pub(crate) fn date_folder(root: &Path, date: DateTime<Local>) -> PathBuf {
    root.join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
}

/// Extension table first, then the provider-reported type
pub(crate) fn categorize(file: &FileRecord, metadata: &MetadataMap) -> FileCategory {
    match file.category() {
        FileCategory::Other => metadata
            .get(keys::TYPE)
            .and_then(MetadataValue::as_text)
            .map(FileCategory::from_reported_type)
            .unwrap_or(FileCategory::Other),
        category => category,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::scanner::FileRecord;
    use std::fs::File;
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    /// Create `name` in `dir` with its mtime `days_ago` days in the past
    pub fn aged_file(dir: &Path, name: &str, days_ago: u64) -> FileRecord {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(days_ago * 24 * 60 * 60);
        file.set_modified(mtime).unwrap();
        drop(file);
        FileRecord::from_path(&path).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JsonConfig;
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct FixedResolver(PathBuf);

    impl DestinationResolver for FixedResolver {
        fn name(&self) -> &str {
            "fixed"
        }

        fn resolve(
            &self,
            _file: &FileRecord,
            _root: &Path,
            _metadata: &MetadataMap,
        ) -> Result<PathBuf, OrganizerError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn strategy_names_are_case_insensitive() {
        assert_eq!(Strategy::from_name("Date"), Strategy::Date);
        assert_eq!(Strategy::from_name(" TYPE "), Strategy::Type);
        assert_eq!(Strategy::from_name("smart"), Strategy::Smart);
        assert_eq!(
            Strategy::from_name("by-project"),
            Strategy::Custom("by-project".to_string())
        );
        assert_eq!(Strategy::default().to_string(), "smart");
    }

    #[test]
    fn registry_builds_builtin_strategies() {
        let registry = ResolverRegistry::new();
        let validator = PathValidator::new();
        let config = JsonConfig::defaults();

        for (strategy, name) in [
            (Strategy::Date, "date"),
            (Strategy::Type, "type"),
            (Strategy::Smart, "smart"),
        ] {
            let resolver = registry.build(&strategy, &validator, &config).unwrap();
            assert_eq!(resolver.name(), name);
        }
    }

    #[test]
    fn registry_resolves_custom_names() {
        let mut registry = ResolverRegistry::new();
        registry.register("fixed", Arc::new(FixedResolver(PathBuf::from("/tmp/x"))));

        let resolver = registry
            .build(
                &Strategy::from_name("fixed"),
                &PathValidator::new(),
                &JsonConfig::defaults(),
            )
            .unwrap();

        assert_eq!(resolver.name(), "fixed");
        assert_eq!(registry.names(), vec!["fixed"]);
    }

    #[test]
    fn unknown_custom_strategy_is_config_error() {
        let result = ResolverRegistry::new().build(
            &Strategy::Custom("missing".to_string()),
            &PathValidator::new(),
            &JsonConfig::defaults(),
        );
        assert!(matches!(result, Err(ConfigError::UnknownStrategy { .. })));
    }

    #[test]
    fn categorize_falls_back_to_reported_type() {
        let temp = TempDir::new().unwrap();
        let file = test_support::aged_file(temp.path(), "scan.heic2", 0);

        let mut metadata = MetadataMap::new();
        assert_eq!(categorize(&file, &metadata), FileCategory::Other);

        metadata.insert(keys::TYPE.to_string(), "image/heic".into());
        assert_eq!(categorize(&file, &metadata), FileCategory::Images);
    }

    #[test]
    fn date_folder_pads_month() {
        let date = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(
            date_folder(Path::new("/dest"), date),
            PathBuf::from("/dest/2024/03")
        );
    }
}
