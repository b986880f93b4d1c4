//! # File Organizer
//!
//! Moves files into date, type or hybrid folder structures and flattens
//! organized trees back into a single directory.
//!
//! ## Core Philosophy
//! - **Validate before touching** - Every path is sanitized before any mutation
//! - **Never overwrite** - Collisions get a numeric suffix instead
//! - **Keep going** - One bad file never stops a batch
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Validation, resolvers, mover and batch orchestration
//! - `config` - Read-only settings by dotted key
//! - `events` - Event-driven progress reporting
//! - `error` - Categorized error types

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG`
/// overrides the default `warn` level.
pub fn init_tracing() {
    init_tracing_with_level("warn");
}

/// Initialize tracing with a fallback level used when `RUST_LOG` is unset
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
