//! # Orchestrator Module
//!
//! Drives a batch: scan, then the per-file pipeline, then completion.
//!
//! ## Per-file pipeline
//! 1. The file exists and is a regular file; the destination is set
//! 2. Source path and extension pass the security checks
//! 3. Metadata is collected (falling back to the modification time)
//! 4. The configured resolver picks the destination
//! 5. The destination's parent directory is created
//! 6. The file is moved (or copied)
//! 7. The result is recorded and progress is emitted
//!
//! A failure in steps 1-6 is recorded against that file and the batch moves
//! on. Only a scan failure ends a batch early.
//!
//! ## States
//! `Scanning -> Processing(i) -> Completed`, with `Failed` reachable only
//! from `Scanning` and `Cancelled` from either of the first two.
//!
//! ## Example
//! ```rust,ignore
//! let orchestrator = BatchOrchestrator::builder()
//!     .strategy(Strategy::Smart)
//!     .build()?;
//!
//! let report = orchestrator.organize(Path::new("Downloads"), Path::new("Sorted"))?;
//! println!("{} moved, {} failed", report.progress.successful_files, report.progress.failed_files);
//! ```

mod cleanup;
mod pipeline;
mod unorganize;

pub use cleanup::{remove_empty_directories, CleanupFailure, CleanupPolicy, CleanupReport};

use crate::config::{keys as config_keys, ConfigProvider, JsonConfig};
use crate::core::metadata::{FsMetadataProvider, MetadataPolicy, MetadataProvider};
use crate::core::mover::{FileMover, FsFileMover};
use crate::core::progress::{OperationKind, OperationProgress, OperationResult};
use crate::core::resolver::{DestinationResolver, FlatResolver, ResolverRegistry, Strategy};
use crate::core::scanner::{ensure_scannable, scan_top_level};
use crate::core::validation::PathValidator;
use crate::error::{ConfigError, ScanError};
use crate::events::{BatchEvent, Event, EventDispatcher, EventObserver, EventSender};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running batch to stop after the current file
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear a previous request so the token can be reused
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Lifecycle of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum BatchState {
    Scanning,
    Processing { index: usize },
    Completed,
    Cancelled,
    Failed,
}

impl BatchState {
    pub fn can_transition_to(&self, next: &BatchState) -> bool {
        use BatchState::*;
        match (self, next) {
            (Scanning, Processing { index: 0 }) => true,
            (Scanning, Completed | Cancelled | Failed) => true,
            (Processing { index }, Processing { index: next }) => *next == index + 1,
            (Processing { .. }, Completed | Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Completed | BatchState::Cancelled | BatchState::Failed
        )
    }

    fn advance(self, next: BatchState) -> BatchState {
        debug_assert!(
            self.can_transition_to(&next),
            "invalid batch transition {:?} -> {:?}",
            self,
            next
        );
        tracing::trace!(from = ?self, to = ?next, "batch state");
        next
    }
}

/// Move files, or copy them and leave the sources alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    #[default]
    Move,
    Copy,
}

/// What a finished (or cancelled) batch hands back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub operation_id: String,
    pub operation: OperationKind,
    pub strategy: String,
    pub state: BatchState,
    pub progress: OperationProgress,
    /// Present when empty source directories were cleaned up
    pub cleanup: Option<CleanupReport>,
}

impl BatchReport {
    pub fn failed_operations(&self) -> Vec<&OperationResult> {
        self.progress.failed_operations()
    }

    pub fn is_complete(&self) -> bool {
        self.state == BatchState::Completed
    }
}

/// Builder for [`BatchOrchestrator`]
pub struct OrchestratorBuilder {
    strategy: Option<Strategy>,
    registry: ResolverRegistry,
    validator: PathValidator,
    metadata: Option<Arc<dyn MetadataProvider>>,
    mover: Option<Arc<dyn FileMover>>,
    config: Option<Arc<dyn ConfigProvider>>,
    dispatcher: EventDispatcher,
    cancellation: CancellationToken,
    cleanup: CleanupPolicy,
    remove_empty_source: Option<bool>,
    mode: TransferMode,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            strategy: None,
            registry: ResolverRegistry::new(),
            validator: PathValidator::new(),
            metadata: None,
            mover: None,
            config: None,
            dispatcher: EventDispatcher::new(),
            cancellation: CancellationToken::new(),
            cleanup: CleanupPolicy::default(),
            remove_empty_source: None,
            mode: TransferMode::Move,
        }
    }

    /// Strategy to organize with (default: `organization.default_strategy`)
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Resolvers available to [`Strategy::Custom`]
    pub fn registry(mut self, registry: ResolverRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn validator(mut self, validator: PathValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn metadata_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    pub fn mover(mut self, mover: Arc<dyn FileMover>) -> Self {
        self.mover = Some(mover);
        self
    }

    pub fn config(mut self, config: Arc<dyn ConfigProvider>) -> Self {
        self.config = Some(config);
        self
    }

    /// Add an observer that receives every event
    pub fn observer(mut self, observer: Arc<dyn EventObserver>) -> Self {
        self.dispatcher.subscribe(observer);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cleanup_policy(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup = policy;
        self
    }

    /// Remove emptied source directories after unorganize
    /// (default: `organization.remove_empty_source`)
    pub fn remove_empty_source(mut self, remove: bool) -> Self {
        self.remove_empty_source = Some(remove);
        self
    }

    pub fn transfer_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve the strategy and assemble the orchestrator
    pub fn build(self) -> Result<BatchOrchestrator, ConfigError> {
        let config: Arc<dyn ConfigProvider> = self
            .config
            .unwrap_or_else(|| Arc::new(JsonConfig::defaults()));

        let strategy = self.strategy.unwrap_or_else(|| {
            Strategy::from_name(config.get_str(config_keys::DEFAULT_STRATEGY, "smart"))
        });
        let resolver = self
            .registry
            .build(&strategy, &self.validator, config.as_ref())?;

        Ok(BatchOrchestrator {
            resolver,
            flat: FlatResolver::new(self.validator.clone()),
            strategy,
            validator: self.validator,
            metadata: self
                .metadata
                .unwrap_or_else(|| Arc::new(FsMetadataProvider::new())),
            mover: self.mover.unwrap_or_else(|| Arc::new(FsFileMover::new())),
            policy: MetadataPolicy::from_config(config.as_ref()),
            dispatcher: self.dispatcher,
            cancellation: self.cancellation,
            cleanup: self.cleanup,
            remove_empty_source: self
                .remove_empty_source
                .unwrap_or_else(|| config.get_bool(config_keys::REMOVE_EMPTY_SOURCE, false)),
            mode: self.mode,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs organize and unorganize batches, one file at a time
pub struct BatchOrchestrator {
    strategy: Strategy,
    resolver: Arc<dyn DestinationResolver>,
    flat: FlatResolver,
    validator: PathValidator,
    metadata: Arc<dyn MetadataProvider>,
    mover: Arc<dyn FileMover>,
    policy: MetadataPolicy,
    dispatcher: EventDispatcher,
    cancellation: CancellationToken,
    cleanup: CleanupPolicy,
    remove_empty_source: bool,
    mode: TransferMode,
}

impl BatchOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Token that cancels batches run by this orchestrator
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Organize the files directly inside `source` into `destination`
    pub fn organize(&self, source: &Path, destination: &Path) -> Result<BatchReport, ScanError> {
        self.organize_dispatching(source, destination, &self.dispatcher)
    }

    /// [`organize`](Self::organize), also sending every event to `events`
    pub fn organize_with_events(
        &self,
        source: &Path,
        destination: &Path,
        events: &EventSender,
    ) -> Result<BatchReport, ScanError> {
        let dispatcher = self.dispatcher_with(events);
        self.organize_dispatching(source, destination, &dispatcher)
    }

    /// Run the per-file pipeline over an explicit list of files
    pub fn organize_files(&self, files: &[PathBuf], destination: &Path) -> BatchReport {
        self.run_batch(
            self.organize_kind(),
            files,
            destination,
            self.resolver.as_ref(),
            &self.dispatcher,
        )
    }

    fn organize_dispatching(
        &self,
        source: &Path,
        destination: &Path,
        events: &EventDispatcher,
    ) -> Result<BatchReport, ScanError> {
        let files = match self.scan_source(source) {
            Ok(files) => files,
            Err(e) => {
                self.report_scan_failure(&e, events);
                return Err(e);
            }
        };

        Ok(self.run_batch(
            self.organize_kind(),
            &files,
            destination,
            self.resolver.as_ref(),
            events,
        ))
    }

    fn scan_source(&self, source: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let source = self.validator.sanitize_path(source)?;
        ensure_scannable(&source)?;
        scan_top_level(&source)
    }

    fn organize_kind(&self) -> OperationKind {
        match self.mode {
            TransferMode::Move => OperationKind::Organize,
            TransferMode::Copy => OperationKind::Copy,
        }
    }

    fn dispatcher_with(&self, events: &EventSender) -> EventDispatcher {
        let mut dispatcher = self.dispatcher.clone();
        dispatcher.subscribe(Arc::new(events.clone()));
        dispatcher
    }

    fn report_scan_failure(&self, error: &ScanError, events: &EventDispatcher) {
        let state = BatchState::Scanning.advance(BatchState::Failed);
        tracing::warn!(?state, "batch failed before processing");
        tracing::debug!(error = %error, "scan failure");
        events.dispatch(Event::Batch(BatchEvent::Failed {
            error: error.to_string(),
        }));
    }
}
