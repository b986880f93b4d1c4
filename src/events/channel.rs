//! Event channel implementation using crossbeam-channel.
//!
//! Carries events from a batch running on a worker thread to whichever
//! front end is listening.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Sending half of an event channel. Cheap to clone.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Send an event, discarding it if the receiver is gone
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half of an event channel
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, or `None` once all senders are dropped
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Number of queued events
    pub fn pending(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Everything currently queued, without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Constructors for event channels
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel
    pub fn new() -> (EventSender, EventReceiver) {
        wrap(unbounded())
    }

    /// Bounded channel; senders block when it is full
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        wrap(bounded(capacity))
    }
}

fn wrap((sender, receiver): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
    (EventSender::new(sender), EventReceiver { inner: receiver })
}

/// A sender nobody listens to
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BatchEvent, BatchProgress};
    use std::thread;

    fn progress(processed: usize) -> Event {
        Event::Batch(BatchEvent::Progress(BatchProgress {
            processed,
            total: 10,
            percent: processed as f64 * 10.0,
            current_file: format!("file{}.txt", processed),
        }))
    }

    #[test]
    fn events_cross_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(progress(4));
        });
        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Batch(BatchEvent::Progress(p)) => {
                assert_eq!(p.processed, 4);
                assert_eq!(p.current_file, "file4.txt");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn null_sender_discards_events() {
        let sender = null_sender();
        sender.send(progress(1));
    }

    #[test]
    fn bounded_channel_holds_capacity() {
        let (sender, receiver) = EventChannel::bounded(2);
        sender.send(progress(1));
        sender.send(progress(2));

        assert_eq!(receiver.pending(), 2);
        assert_eq!(receiver.drain().len(), 2);
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn receiver_ends_when_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        sender.send(progress(1));
        drop(sender);

        assert_eq!(receiver.iter().count(), 1);
        assert!(receiver.recv().is_none());
    }
}
