//! The set of indexes a collection maintains.

use super::MemberIndex;
use crate::model::MemberRef;
use crate::types::Cid;
use roster_value::Value;
use std::collections::HashMap;

/// Every named index of one collection, plus the creation-identity map.
///
/// The registry is the single place that knows which members are
/// registered: a member is registered exactly when its cid is present in
/// the identity map, and a registered member is filed in every named
/// index whose attribute it holds an indexable value for.
pub struct IndexRegistry {
    /// Named indexes, main index first.
    indexes: Vec<MemberIndex>,
    /// Every registered member by creation identity.
    by_cid: HashMap<Cid, MemberRef>,
}

impl IndexRegistry {
    /// Creates an empty registry for `names`. The first name is the main
    /// index.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            indexes: names.into_iter().map(MemberIndex::new).collect(),
            by_cid: HashMap::new(),
        }
    }

    /// Name of the main index.
    pub fn main_name(&self) -> &str {
        self.indexes.first().map_or("", MemberIndex::attribute)
    }

    /// Names of every maintained index, main index first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indexes.iter().map(MemberIndex::attribute)
    }

    /// Returns the named index.
    pub fn index(&self, name: &str) -> Option<&MemberIndex> {
        self.indexes.iter().find(|index| index.attribute() == name)
    }

    /// Returns true if `name` is a maintained index.
    pub fn has_index(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    /// Registers `member` and files it in every index.
    pub fn register(&mut self, member: &MemberRef) {
        self.by_cid.insert(member.cid(), MemberRef::clone(member));
        for index in &mut self.indexes {
            index.insert(member);
        }
    }

    /// Re-files a registered member under its current attribute values.
    ///
    /// Returns false if the member is not registered.
    pub fn reindex(&mut self, cid: Cid) -> bool {
        let Some(member) = self.by_cid.get(&cid).cloned() else {
            return false;
        };
        for index in &mut self.indexes {
            index.insert(&member);
        }
        true
    }

    /// Purges the member from every index and unregisters it.
    pub fn deindex(&mut self, cid: Cid) -> Option<MemberRef> {
        for index in &mut self.indexes {
            index.remove(cid);
        }
        self.by_cid.remove(&cid)
    }

    /// Looks up `key` in the main index.
    pub fn lookup(&self, key: &Value) -> Option<&MemberRef> {
        self.indexes.first().and_then(|index| index.lookup(key))
    }

    /// Looks up `key` in the named index. Returns `None` for unknown
    /// indexes as well as absent keys.
    pub fn lookup_in(&self, name: &str, key: &Value) -> Option<&MemberRef> {
        self.index(name).and_then(|index| index.lookup(key))
    }

    /// Returns the registered member with `cid`.
    pub fn by_cid(&self, cid: Cid) -> Option<&MemberRef> {
        self.by_cid.get(&cid)
    }

    /// Resolves a member reference to the registered member it stands for.
    ///
    /// The member's main-index value wins; a member without one resolves
    /// only to itself.
    pub fn resolve(&self, member: &MemberRef) -> Option<&MemberRef> {
        member
            .get(self.main_name())
            .filter(Value::is_indexable)
            .and_then(|key| self.lookup(&key))
            .or_else(|| self.by_cid(member.cid()))
    }

    /// Returns true if a member with `cid` is registered.
    pub fn contains(&self, cid: Cid) -> bool {
        self.by_cid.contains_key(&cid)
    }

    /// Number of registered members.
    pub fn len(&self) -> usize {
        self.by_cid.len()
    }

    /// Returns true if no member is registered.
    pub fn is_empty(&self) -> bool {
        self.by_cid.is_empty()
    }

    /// Unregisters every member, keeping the index definitions.
    pub fn clear(&mut self) {
        for index in &mut self.indexes {
            index.clear();
        }
        self.by_cid.clear();
    }
}

impl std::fmt::Debug for IndexRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("indexes", &self.names().collect::<Vec<_>>())
            .field("members", &self.by_cid.len())
            .finish()
    }
}
