//! Hybrid layout chosen per file.
//!
//! ## Decision order
//! 1. Organization date within the recent window: `date_primary`
//! 2. Media with rich metadata: `date_then_type`
//! 3. Documents: `date_then_type`
//! 4. Anything else: `date_then_type`
//!
//! `type_then_date` and `type_primary` are valid placements but the
//! decision rules never select them.

use super::{categorize, check_file, date_folder, organization_date, place, DestinationResolver};
use crate::core::category::FileCategory;
use crate::core::metadata::{has_rich_metadata, MetadataMap};
use crate::core::scanner::FileRecord;
use crate::core::validation::PathValidator;
use crate::error::OrganizerError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default recent window in days
pub const DEFAULT_RECENT_DAYS: i64 = 30;

/// Folder layout picked for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyDecision {
    /// `<root>/<YYYY>/<MM>`
    DatePrimary,
    /// `<root>/<Category>/<YYYY>/<MM>`
    TypeThenDate,
    /// `<root>/<YYYY>/<MM>/<Category>`
    DateThenType,
    /// `<root>/<Category>`
    TypePrimary,
}

impl StrategyDecision {
    /// Folder for this layout
    pub fn folder(&self, root: &Path, category: FileCategory, date: DateTime<Local>) -> PathBuf {
        match self {
            StrategyDecision::DatePrimary => date_folder(root, date),
            StrategyDecision::TypeThenDate => date_folder(&root.join(category.folder_name()), date),
            StrategyDecision::DateThenType => date_folder(root, date).join(category.folder_name()),
            StrategyDecision::TypePrimary => root.join(category.folder_name()),
        }
    }
}

/// Chooses a [`StrategyDecision`] per file
#[derive(Debug, Clone)]
pub struct SmartResolver {
    validator: PathValidator,
    recent_days: i64,
}

impl SmartResolver {
    pub fn new(validator: PathValidator) -> Self {
        Self {
            validator,
            recent_days: DEFAULT_RECENT_DAYS,
        }
    }

    /// Files at most this many days old count as recent
    pub fn with_recent_days(mut self, days: i64) -> Self {
        self.recent_days = days;
        self
    }

    /// Decide the layout for `file` as of `now`
    pub fn decide(
        &self,
        file: &FileRecord,
        metadata: &MetadataMap,
        now: DateTime<Local>,
    ) -> StrategyDecision {
        let age_days = now
            .signed_duration_since(organization_date(file, metadata))
            .num_days();
        if age_days <= self.recent_days {
            return StrategyDecision::DatePrimary;
        }

        let category = file.category();
        let media_with_details = category.is_media() && has_rich_metadata(metadata);
        match (media_with_details, category.is_document()) {
            (true, _) => StrategyDecision::DateThenType,
            (false, true) => StrategyDecision::DateThenType,
            (false, false) => StrategyDecision::DateThenType,
        }
    }
}

impl DestinationResolver for SmartResolver {
    fn name(&self) -> &str {
        "smart"
    }

    fn resolve(
        &self,
        file: &FileRecord,
        root: &Path,
        metadata: &MetadataMap,
    ) -> Result<PathBuf, OrganizerError> {
        check_file(&self.validator, file)?;

        let decision = self.decide(file, metadata, Local::now());
        tracing::debug!(file = %file.name, ?decision, "smart placement");

        let folder = decision.folder(
            root,
            categorize(file, metadata),
            organization_date(file, metadata),
        );
        place(&self.validator, &folder, file, None)
    }
}
