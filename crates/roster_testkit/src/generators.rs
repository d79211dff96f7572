//! Property-based test generators using proptest.
//!
//! Provides strategies for generating member attributes and sequences of
//! collection operations. Ids are drawn from a small range so that
//! batches collide with each other and with existing members.

use proptest::prelude::*;
use roster_value::{attrs, Attributes};

/// Largest id generated (exclusive).
pub const ID_RANGE: i64 = 24;

/// Strategy for generating member ids.
pub fn id_strategy() -> impl Strategy<Value = i64> {
    0..ID_RANGE
}

/// Strategy for generating usernames.
pub fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,6}").expect("Invalid regex")
}

/// Strategy for generating member attributes carrying an id.
pub fn member_strategy() -> impl Strategy<Value = Attributes> {
    (id_strategy(), username_strategy(), any::<u8>()).prop_map(|(id, username, rank)| {
        attrs! { "id" => id, "username" => username, "rank" => u32::from(rank) }
    })
}

/// Strategy for generating a batch of member attributes.
pub fn batch_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Attributes>> {
    prop::collection::vec(member_strategy(), min..max)
}

/// A mutating call on a collection.
#[derive(Debug, Clone)]
pub enum CollectionOperation {
    /// `add` a batch.
    Add(Vec<Attributes>),
    /// `set` a batch with the default options.
    Set(Vec<Attributes>),
    /// `remove` members by id.
    Remove(Vec<i64>),
    /// `reset` to a batch.
    Reset(Vec<Attributes>),
}

/// Strategy for generating collection operations.
pub fn operation_strategy() -> impl Strategy<Value = CollectionOperation> {
    prop_oneof![
        4 => batch_strategy(0, 8).prop_map(CollectionOperation::Add),
        2 => batch_strategy(0, 8).prop_map(CollectionOperation::Set),
        3 => prop::collection::vec(id_strategy(), 0..6).prop_map(CollectionOperation::Remove),
        1 => batch_strategy(0, 6).prop_map(CollectionOperation::Reset),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<CollectionOperation>> {
    prop::collection::vec(operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
