//! # Core Module
//!
//! The front-end-agnostic organizing engine.
//!
//! ## Modules
//! - `validation` - Path sanitization and safety checks
//! - `scanner` - Top-level listing and recursive walks
//! - `category` - Extension to category mapping
//! - `metadata` - File metadata extraction and privacy filtering
//! - `resolver` - Destination strategies (date, type, smart, flat)
//! - `mover` - Filesystem move and copy primitives
//! - `progress` - Per-batch progress and operation results
//! - `orchestrator` - Runs organize and unorganize batches
//! - `redact` - Strips user paths from messages

pub mod category;
pub mod metadata;
pub mod mover;
pub mod orchestrator;
pub mod progress;
pub mod redact;
pub mod resolver;
pub mod scanner;
pub mod validation;

// Re-export commonly used types
pub use category::FileCategory;
pub use metadata::{FsMetadataProvider, MetadataMap, MetadataPolicy, MetadataProvider, MetadataValue};
pub use mover::{FileMover, FsFileMover};
pub use orchestrator::{
    BatchOrchestrator, BatchReport, BatchState, CancellationToken, OrchestratorBuilder, TransferMode,
};
pub use progress::{OperationKind, OperationProgress, OperationResult, ProgressTracker};
pub use redact::PathRedactor;
pub use resolver::{DestinationResolver, ResolverRegistry, Strategy};
pub use scanner::FileRecord;
pub use validation::PathValidator;
