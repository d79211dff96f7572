//! Synchronous publish/subscribe event stream.

use super::Event;
use crate::types::ListenerId;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Wildcard event name: listeners on this channel receive every event.
pub const ALL: &str = "all";

/// An event handler.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Listener {
    id: ListenerId,
    name: String,
    handler: Handler,
    once: bool,
}

impl Listener {
    fn matches(&self, name: &str) -> bool {
        self.name == ALL || self.name == name
    }
}

/// An event stream that delivers events to handlers synchronously.
///
/// The stream:
/// - Calls handlers in registration order, on the triggering thread
/// - Holds no lock while a handler runs, so handlers may register or
///   remove listeners and trigger further events
/// - Also forwards every event to channel subscribers
pub struct Events {
    /// Registered handlers.
    listeners: RwLock<Vec<Listener>>,
    /// Channel subscribers (senders).
    subscribers: Mutex<Vec<Sender<Event>>>,
    /// Next listener ID.
    next_id: AtomicU64,
}

impl Events {
    /// Creates an event stream with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers `handler` for events named `name` (or every event, for
    /// [`ALL`]).
    pub fn on<F>(&self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register(name.into(), Arc::new(handler), false)
    }

    /// Registers `handler` to run for the next matching event only.
    pub fn once<F>(&self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register(name.into(), Arc::new(handler), true)
    }

    /// Registers an already shared handler.
    pub fn on_handler(&self, name: impl Into<String>, handler: Handler) -> ListenerId {
        self.register(name.into(), handler, false)
    }

    fn register(&self, name: String, handler: Handler, once: bool) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push(Listener {
            id,
            name,
            handler,
            once,
        });
        id
    }

    /// Removes one listener. Returns false if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    /// Removes every listener registered under `name`, returning how many
    /// were removed.
    pub fn off_event(&self, name: &str) -> usize {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| l.name != name);
        before - listeners.len()
    }

    /// Removes every listener and channel subscriber.
    pub fn clear(&self) {
        self.listeners.write().clear();
        self.subscribers.lock().clear();
    }

    /// Subscribes a channel to the stream.
    ///
    /// Returns a receiver that will receive all future events. Dropped
    /// receivers are pruned on the next emit.
    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Delivers `event` to every matching handler, then to channel
    /// subscribers.
    ///
    /// The set of handlers is fixed when the call starts: a listener
    /// removed by an earlier handler still receives this event, a listener
    /// added by one does not.
    pub fn trigger(&self, event: &Event) {
        let name = event.name();
        let matched: Vec<Handler> = {
            let mut listeners = self.listeners.write();
            let matched = listeners
                .iter()
                .filter(|l| l.matches(&name))
                .map(|l| Arc::clone(&l.handler))
                .collect();
            listeners.retain(|l| !(l.once && l.matches(&name)));
            matched
        };

        for handler in matched {
            handler(event);
        }

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns the number of registered handlers.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns the number of active channel subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}
