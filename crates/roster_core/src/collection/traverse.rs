//! Read-only traversal.
//!
//! Every traversal works on a snapshot of the member sequence taken when
//! the call starts. Callbacks run with no lock held and may mutate the
//! collection; such changes are not reflected in the running traversal.

use super::Collection;
use crate::model::{MemberRef, Model};
use roster_value::Value;
use std::collections::BTreeMap;

impl Collection {
    /// Snapshot of the members in collection order.
    pub fn members(&self) -> Vec<MemberRef> {
        self.shared.state.read().members.clone()
    }

    /// Iterates over a snapshot of the members.
    pub fn iter(&self) -> std::vec::IntoIter<MemberRef> {
        self.members().into_iter()
    }

    /// Calls `f` with every member and its position.
    pub fn for_each(&self, mut f: impl FnMut(&MemberRef, usize)) {
        for (position, member) in self.members().iter().enumerate() {
            f(member, position);
        }
    }

    /// Maps every member.
    pub fn map<T>(&self, f: impl FnMut(&MemberRef) -> T) -> Vec<T> {
        self.members().iter().map(f).collect()
    }

    /// Members matching `predicate`.
    pub fn filter(&self, mut predicate: impl FnMut(&MemberRef) -> bool) -> Vec<MemberRef> {
        self.iter().filter(|m| predicate(m)).collect()
    }

    /// First member matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&MemberRef) -> bool) -> Option<MemberRef> {
        self.iter().find(|m| predicate(m))
    }

    /// Returns true if any member matches.
    pub fn any(&self, predicate: impl FnMut(&MemberRef) -> bool) -> bool {
        self.members().iter().any(predicate)
    }

    /// Returns true if every member matches.
    pub fn all(&self, predicate: impl FnMut(&MemberRef) -> bool) -> bool {
        self.members().iter().all(predicate)
    }

    /// Splits members into those matching `predicate` and the rest.
    pub fn partition(
        &self,
        mut predicate: impl FnMut(&MemberRef) -> bool,
    ) -> (Vec<MemberRef>, Vec<MemberRef>) {
        self.iter().partition(|m| predicate(m))
    }

    /// Position of `member`.
    pub fn index_of(&self, member: &MemberRef) -> Option<usize> {
        let cid = member.cid();
        self.shared
            .state
            .read()
            .members
            .iter()
            .position(|m| m.cid() == cid)
    }

    /// Returns true if `member` itself is held by this collection.
    pub fn contains(&self, member: &MemberRef) -> bool {
        self.shared.state.read().indexes.contains(member.cid())
    }

    /// The first member.
    pub fn first(&self) -> Option<MemberRef> {
        self.shared.state.read().members.first().cloned()
    }

    /// The last member.
    pub fn last(&self) -> Option<MemberRef> {
        self.shared.state.read().members.last().cloned()
    }

    /// Value of `attribute` for every member.
    pub fn pluck(&self, attribute: &str) -> Vec<Option<Value>> {
        self.map(|m| m.get(attribute))
    }

    /// Members grouped by their value of `attribute`. Members lacking it
    /// are grouped under `Null`.
    pub fn group_by(&self, attribute: &str) -> BTreeMap<Value, Vec<MemberRef>> {
        let mut groups: BTreeMap<Value, Vec<MemberRef>> = BTreeMap::new();
        for member in self.members() {
            groups
                .entry(member.get(attribute).unwrap_or_default())
                .or_default()
                .push(member);
        }
        groups
    }

    /// Number of members per value of `attribute`.
    pub fn count_by(&self, attribute: &str) -> BTreeMap<Value, usize> {
        let mut counts = BTreeMap::new();
        for member in self.members() {
            *counts
                .entry(member.get(attribute).unwrap_or_default())
                .or_insert(0) += 1;
        }
        counts
    }

    /// Members keyed by their value of `attribute`. Later members win.
    pub fn index_by(&self, attribute: &str) -> BTreeMap<Value, MemberRef> {
        self.members()
            .into_iter()
            .map(|m| (m.get(attribute).unwrap_or_default(), m))
            .collect()
    }

    /// Members ordered by `attribute`, without reordering the collection.
    ///
    /// The sort is stable and members lacking the attribute come last.
    pub fn sort_by(&self, attribute: &str) -> Vec<MemberRef> {
        let mut members = self.members();
        members.sort_by(|a, b| {
            Value::cmp_missing_last(a.get(attribute).as_ref(), b.get(attribute).as_ref())
        });
        members
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = MemberRef;
    type IntoIter = std::vec::IntoIter<MemberRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CollectionConfig;
    use crate::model::{MemberRef, Model, Record};
    use crate::{Collection, Value};
    use roster_value::attrs;

    fn stooges() -> Collection {
        Collection::with_members(
            CollectionConfig::new(),
            vec![
                attrs! { "id" => 1, "name" => "moe", "hair" => "bowl" },
                attrs! { "id" => 2, "name" => "curly", "hair" => "none" },
                attrs! { "id" => 3, "name" => "larry", "hair" => "frizz" },
                attrs! { "id" => 4, "name" => "shemp", "hair" => "bowl" },
            ],
        )
        .unwrap()
    }

    fn id(member: &MemberRef) -> i64 {
        member.get("id").and_then(|id| id.as_integer()).unwrap_or(-1)
    }

    #[test]
    fn iteration_follows_order() {
        let collection = stooges();
        let ids: Vec<i64> = collection.iter().map(|m| id(&m)).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let mut positions = Vec::new();
        collection.for_each(|_, position| positions.push(position));
        assert_eq!(positions, vec![0, 1, 2, 3]);

        let mut count = 0;
        for _ in &collection {
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn predicates() {
        let collection = stooges();
        let bowls = collection.filter(|m| m.get("hair") == Some(Value::from("bowl")));
        assert_eq!(bowls.iter().map(id).collect::<Vec<_>>(), vec![1, 4]);

        assert_eq!(collection.find(|m| id(m) > 2).map(|m| id(&m)), Some(3));
        assert!(collection.any(|m| id(m) == 4));
        assert!(collection.all(|m| id(m) > 0));
        assert!(!collection.all(|m| id(m) > 1));

        let (even, odd) = collection.partition(|m| id(m) % 2 == 0);
        assert_eq!(even.len(), 2);
        assert_eq!(odd.len(), 2);
    }

    #[test]
    fn positions_and_membership() {
        let collection = stooges();
        let larry = collection.get(3i64).unwrap();
        let stranger: MemberRef = Record::new(attrs! { "id" => 3 });

        assert_eq!(collection.index_of(&larry), Some(2));
        assert!(collection.contains(&larry));
        assert!(!collection.contains(&stranger));
        assert_eq!(collection.first().map(|m| id(&m)), Some(1));
        assert_eq!(collection.last().map(|m| id(&m)), Some(4));
    }

    #[test]
    fn attribute_helpers() {
        let collection = stooges();

        assert_eq!(
            collection.pluck("name")[1],
            Some(Value::from("curly"))
        );

        let groups = collection.group_by("hair");
        assert_eq!(groups[&Value::from("bowl")].len(), 2);

        let counts = collection.count_by("hair");
        assert_eq!(counts[&Value::from("frizz")], 1);

        let by_name = collection.index_by("name");
        assert_eq!(id(&by_name[&Value::from("shemp")]), 4);

        let sorted: Vec<i64> = collection.sort_by("name").iter().map(id).collect();
        assert_eq!(sorted, vec![2, 3, 1, 4]);
        assert_eq!(id(&collection.at(0).unwrap()), 1);
    }

    #[test]
    fn callbacks_may_mutate() {
        let collection = stooges();
        collection.for_each(|member, _| {
            collection.remove(member);
        });
        assert!(collection.is_empty());
    }
}
