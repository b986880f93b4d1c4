//! # Events Module
//!
//! Typed progress reporting for any front end.
//!
//! ## Design
//! A batch emits [`Event`]s through an [`EventDispatcher`]. Observers are
//! channel senders or plain closures; a failing observer is contained at
//! the dispatch boundary and never reaches the batch.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Batch(BatchEvent::Progress(p)) = event {
//!             println!("{}/{} {}", p.processed, p.total, p.current_file);
//!         }
//!     }
//! });
//!
//! orchestrator.organize_with_events(&source, &destination, &sender)?;
//! ```

mod channel;
mod observer;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use observer::{EventDispatcher, EventObserver};
pub use types::*;
