//! Argument and result shapes of the mutating entry points.

use crate::error::CoreResult;
use crate::model::{MemberRef, Record};
use roster_value::{Attributes, Value};
use std::sync::Arc;

/// One element handed to `set`, `add` or `reset`.
#[derive(Debug, Clone)]
pub enum Input {
    /// Raw attributes. Anything but a map is skipped.
    Raw(Value),
    /// An already constructed member.
    Member(MemberRef),
}

/// One element handed to `get` or `remove`.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// A value of the index being searched.
    Key(Value),
    /// A member, resolved by its identifying value or creation identity.
    Member(MemberRef),
}

/// A single element or a list of them.
///
/// The shape is kept through a call: a singular argument yields a
/// singular [`Returned`].
#[derive(Debug, Clone)]
pub enum Batch<T> {
    /// A single, possibly absent, element.
    One(Option<T>),
    /// A list of elements.
    Many(Vec<T>),
}

impl<T> Batch<T> {
    /// A singular batch holding `item`.
    pub fn one(item: T) -> Self {
        Self::One(Some(item))
    }

    /// A singular batch holding nothing.
    pub fn none() -> Self {
        Self::One(None)
    }

    /// A list batch.
    pub fn many(items: impl IntoIterator<Item = T>) -> Self {
        Self::Many(items.into_iter().collect())
    }

    /// Returns true for the singular shape.
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::One(_))
    }

    /// Number of present elements.
    pub fn len(&self) -> usize {
        match self {
            Self::One(item) => usize::from(item.is_some()),
            Self::Many(items) => items.len(),
        }
    }

    /// Returns true if no element is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits into the singular flag and the elements.
    pub fn into_parts(self) -> (bool, Vec<T>) {
        match self {
            Self::One(item) => (true, item.into_iter().collect()),
            Self::Many(items) => (false, items),
        }
    }

    /// Converts every element, keeping the shape.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Batch<U> {
        match self {
            Self::One(item) => Batch::One(item.map(f)),
            Self::Many(items) => Batch::Many(items.into_iter().map(f).collect()),
        }
    }
}

impl Batch<Input> {
    /// Builds raw inputs from decoded JSON.
    ///
    /// A top-level array becomes a list batch with one element per item;
    /// anything else is a single element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Value`](crate::CoreError::Value) if the
    /// document holds a float or an out-of-range integer.
    pub fn from_json(json: serde_json::Value) -> CoreResult<Self> {
        Ok(match Value::try_from(json)? {
            Value::Array(items) => Batch::Many(items.into_iter().map(Input::Raw).collect()),
            single => Batch::one(Input::Raw(single)),
        })
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Result of a mutating call, shaped like its argument.
///
/// A list result has one slot per input element. A slot is `None` when
/// its element was skipped, rejected by validation or, for `remove`, not
/// found.
#[derive(Debug, Clone)]
pub enum Returned {
    /// Result of a singular call.
    One(Option<MemberRef>),
    /// Result of a list call.
    Many(Vec<Option<MemberRef>>),
}

impl Returned {
    pub(crate) fn from_parts(singular: bool, slots: Vec<Option<MemberRef>>) -> Self {
        if singular {
            Self::One(slots.into_iter().next().flatten())
        } else {
            Self::Many(slots)
        }
    }

    /// The single member, or the first slot of a list result.
    pub fn one(self) -> Option<MemberRef> {
        match self {
            Self::One(member) => member,
            Self::Many(slots) => slots.into_iter().next().flatten(),
        }
    }

    /// Every slot, a singular result becoming a one-slot list.
    pub fn many(self) -> Vec<Option<MemberRef>> {
        match self {
            Self::One(member) => vec![member],
            Self::Many(slots) => slots,
        }
    }

    /// The members that are present, in slot order.
    pub fn members(self) -> Vec<MemberRef> {
        self.many().into_iter().flatten().collect()
    }

    /// Returns true if this is a singular result.
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::One(_))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(slots) => slots.len(),
        }
    }

    /// Returns true if there is no slot.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<Attributes> for Input {
    fn from(attributes: Attributes) -> Self {
        Self::Raw(Value::Map(attributes))
    }
}

impl From<MemberRef> for Input {
    fn from(member: MemberRef) -> Self {
        Self::Member(member)
    }
}

impl From<&MemberRef> for Input {
    fn from(member: &MemberRef) -> Self {
        Self::Member(Arc::clone(member))
    }
}

impl From<Arc<Record>> for Input {
    fn from(record: Arc<Record>) -> Self {
        Self::Member(record)
    }
}

impl From<Value> for Lookup {
    fn from(key: Value) -> Self {
        Self::Key(key)
    }
}

impl From<i64> for Lookup {
    fn from(key: i64) -> Self {
        Self::Key(Value::Integer(key))
    }
}

impl From<&str> for Lookup {
    fn from(key: &str) -> Self {
        Self::Key(Value::from(key))
    }
}

impl From<String> for Lookup {
    fn from(key: String) -> Self {
        Self::Key(Value::Text(key))
    }
}

impl From<MemberRef> for Lookup {
    fn from(member: MemberRef) -> Self {
        Self::Member(member)
    }
}

impl From<&MemberRef> for Lookup {
    fn from(member: &MemberRef) -> Self {
        Self::Member(Arc::clone(member))
    }
}

impl From<Arc<Record>> for Lookup {
    fn from(record: Arc<Record>) -> Self {
        Self::Member(record)
    }
}

/// Implements `From<S>`, `From<Option<S>>` and `From<Vec<S>>` for
/// `Batch<T>` for every listed source `S` that converts into `T`.
macro_rules! batch_from {
    ($item:ty => $($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Batch<$item> {
                fn from(source: $source) -> Self {
                    Batch::One(Some(<$item>::from(source)))
                }
            }

            impl From<Option<$source>> for Batch<$item> {
                fn from(source: Option<$source>) -> Self {
                    Batch::One(source.map(<$item>::from))
                }
            }

            impl From<Vec<$source>> for Batch<$item> {
                fn from(sources: Vec<$source>) -> Self {
                    Batch::Many(sources.into_iter().map(<$item>::from).collect())
                }
            }
        )+
    };
}

batch_from!(Input => Input, Value, Attributes, MemberRef, Arc<Record>);
batch_from!(Lookup => Lookup, Value, i64, String, MemberRef, Arc<Record>);

impl From<&str> for Batch<Lookup> {
    fn from(key: &str) -> Self {
        Batch::one(Lookup::from(key))
    }
}

impl From<&MemberRef> for Batch<Input> {
    fn from(member: &MemberRef) -> Self {
        Batch::one(Input::from(member))
    }
}

impl From<&MemberRef> for Batch<Lookup> {
    fn from(member: &MemberRef) -> Self {
        Batch::one(Lookup::from(member))
    }
}

impl From<&[MemberRef]> for Batch<Lookup> {
    fn from(members: &[MemberRef]) -> Self {
        Batch::Many(members.iter().map(Lookup::from).collect())
    }
}

impl From<&[MemberRef]> for Batch<Input> {
    fn from(members: &[MemberRef]) -> Self {
        Batch::Many(members.iter().map(Input::from).collect())
    }
}

impl From<Vec<&str>> for Batch<Lookup> {
    fn from(keys: Vec<&str>) -> Self {
        Batch::Many(keys.into_iter().map(Lookup::from).collect())
    }
}
