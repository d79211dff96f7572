//! Ties between a collection and its members.
//!
//! Adding a reference files the member in every index, claims its owner
//! slot and bridges its event stream into the collection's. Removing one
//! undoes all three.

use super::{Collection, Lookup, State, WeakCollection};
use crate::event::{Event, EventKind, ALL};
use crate::model::{MemberRef, Model};
use crate::types::Cid;
use tracing::trace;

impl Collection {
    /// Registers `member` and wires it. The caller holds the state lock.
    pub(super) fn add_reference(&self, state: &mut State, member: &MemberRef) {
        state.indexes.register(member);
        member.owner().claim(self);
        if let Some(events) = member.events() {
            let weak = self.downgrade();
            let id = events.on(ALL, move |event| on_member_event(&weak, event));
            if let Some(stale) = state.wiring.insert(member.cid(), id) {
                events.off(stale);
            }
        }
    }

    /// Releases the owner slot and unwires `member`.
    pub(super) fn remove_reference(&self, state: &mut State, member: &MemberRef) {
        member.owner().release(self);
        if let Some(id) = state.wiring.remove(&member.cid()) {
            if let Some(events) = member.events() {
                events.off(id);
            }
        }
    }

    /// Takes the member with `cid` out of the sequence and every index.
    ///
    /// Returns the member and the position it occupied.
    pub(super) fn detach(&self, state: &mut State, cid: Cid) -> Option<(MemberRef, usize)> {
        let index = state.members.iter().position(|m| m.cid() == cid)?;
        let member = state.members.remove(index);
        state.indexes.deindex(cid);
        self.remove_reference(state, &member);
        Some((member, index))
    }

    /// Re-files `member` after its `attribute` changed, if that attribute
    /// is indexed.
    fn reindex(&self, member: &MemberRef, attribute: &str) {
        let mut state = self.shared.state.write();
        if state.indexes.has_index(attribute) && state.indexes.reindex(member.cid()) {
            trace!(attribute, cid = %member.cid(), "reindexed member");
        }
    }
}

/// Bridges one event from a member's stream into the collection's.
fn on_member_event(weak: &WeakCollection, event: &Event) {
    let Some(collection) = weak.upgrade() else {
        return;
    };

    match &event.kind {
        // Membership notifications belong to whichever collection sent them.
        EventKind::Add | EventKind::Remove { .. } => return,
        EventKind::Destroy => {
            if let Some(member) = &event.member {
                collection.remove_with(Lookup::Member(MemberRef::clone(member)), &event.options);
            }
        }
        EventKind::Change {
            attribute: Some(attribute),
        } => {
            if let Some(member) = &event.member {
                collection.reindex(member, attribute);
            }
        }
        _ => {}
    }

    let mut bridged = event.clone();
    bridged.collection = Some(collection.clone());
    collection.trigger(&bridged);
}
