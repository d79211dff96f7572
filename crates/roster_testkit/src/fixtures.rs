//! Test fixtures and collection helpers.
//!
//! Provides sample members, an event recorder and logging setup for
//! tests.

use roster_core::{
    Collection, CollectionConfig, Event, EventKind, ListenerId, MemberRef, Model, RecordFactory,
    ValidationError,
};
use roster_value::{attrs, Attributes, Value};
use parking_lot::Mutex;
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per process.
///
/// The filter is read from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// The three stooges, in the order they are usually added.
pub fn stooges() -> Vec<Attributes> {
    vec![
        attrs! { "id" => 1, "name" => "moe", "username" => "moe" },
        attrs! { "id" => 2, "name" => "curly", "username" => "curly" },
        attrs! { "id" => 3, "name" => "larry", "username" => "larry" },
    ]
}

/// A collection seeded with [`stooges`].
pub fn stooge_collection(config: CollectionConfig) -> Collection {
    Collection::with_members(config, stooges()).expect("Failed to create collection")
}

/// The `name` attribute of a member, or an empty string.
pub fn name_of(member: &MemberRef) -> String {
    text_of(member, "name")
}

/// A text attribute of a member, or an empty string.
pub fn text_of(member: &MemberRef, attribute: &str) -> String {
    member
        .get(attribute)
        .and_then(|value| value.as_text().map(str::to_string))
        .unwrap_or_default()
}

/// The integer `id` of a member, or -1.
pub fn id_of(member: &MemberRef) -> i64 {
    member
        .get("id")
        .and_then(|value| value.as_integer())
        .unwrap_or(-1)
}

/// Names of every member in collection order.
pub fn names(collection: &Collection) -> Vec<String> {
    collection.map(name_of)
}

/// Ids of every member in collection order.
pub fn ids(collection: &Collection) -> Vec<i64> {
    collection.map(id_of)
}

/// A factory whose members reject every set of attributes.
pub fn rejecting_factory(message: &'static str) -> RecordFactory {
    RecordFactory::new().with_validator(move |_| Err(ValidationError::new(message)))
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Event name.
    pub name: String,
    /// The member's `id`, if the event carried a member with one.
    pub member_id: Option<Value>,
    /// Position carried by `remove` events.
    pub index: Option<usize>,
    /// Error carried by `invalid` events.
    pub error: Option<ValidationError>,
}

impl RecordedEvent {
    fn from_event(event: &Event) -> Self {
        let (index, error) = match &event.kind {
            EventKind::Remove { index } => (Some(*index), None),
            EventKind::Invalid { error } => (None, Some(error.clone())),
            _ => (None, None),
        };
        Self {
            name: event.name().into_owned(),
            member_id: event.member.as_ref().and_then(|m| m.get("id")),
            index,
            error,
        }
    }
}

/// Records every event a collection emits.
pub struct EventLog {
    collection: Collection,
    listener: ListenerId,
    entries: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventLog {
    /// Starts recording `collection`'s `all` channel.
    pub fn attach(collection: &Collection) -> Self {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&entries);
        let listener = collection.on(roster_core::ALL, move |event: &Event| {
            sink.lock().push(RecordedEvent::from_event(event));
        });
        Self {
            collection: collection.clone(),
            listener,
            entries,
        }
    }

    /// Every recorded event.
    pub fn entries(&self) -> Vec<RecordedEvent> {
        self.entries.lock().clone()
    }

    /// Recorded event names, in order.
    pub fn names(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.name).collect()
    }

    /// How many events named `name` were recorded.
    pub fn count(&self, name: &str) -> usize {
        self.entries().iter().filter(|e| e.name == name).count()
    }

    /// Forgets recorded events.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        self.collection.off(self.listener);
    }
}
