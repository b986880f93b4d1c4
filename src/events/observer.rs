//! Observer fan-out with panic containment.

use super::{Event, EventSender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Something that wants to hear about events
pub trait EventObserver: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl EventObserver for EventSender {
    fn on_event(&self, event: &Event) {
        self.send(event.clone());
    }
}

impl<F> EventObserver for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Delivers each event to every subscribed observer.
///
/// A panicking observer is logged and skipped; the remaining observers
/// still receive the event and the caller never sees the panic.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    observers: Vec<Arc<dyn EventObserver>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with a single channel observer
    pub fn with_sender(sender: EventSender) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.subscribe(Arc::new(sender));
        dispatcher
    }

    pub fn subscribe(&mut self, observer: Arc<dyn EventObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&self, event: Event) {
        for (index, observer) in self.observers.iter().enumerate() {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(&event)));
            if delivered.is_err() {
                tracing::warn!(observer = index, "event observer panicked");
            }
        }
    }
}
