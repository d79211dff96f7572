//! The reconciliation engine behind `set`, `add` and `reset`.

use super::{Batch, Collection, Input, Returned, State};
use crate::error::ValidationError;
use crate::event::{Event, EventKind};
use crate::model::{MemberRef, Model, Record};
use crate::options::SetOptions;
use crate::types::Cid;
use roster_value::{Attributes, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Everything decided before the state lock is taken.
#[derive(Default)]
struct Plan {
    /// Result slot per input element.
    slots: Vec<Option<MemberRef>>,
    /// New members with the slot each one fills, in input order.
    to_add: Vec<(usize, MemberRef)>,
    /// New members by main-index value, for duplicates within the batch.
    staged_keys: HashMap<Value, MemberRef>,
    /// Cids of new members.
    staged_cids: HashSet<Cid>,
    /// Cids of existing members an input matched.
    wanted: HashSet<Cid>,
    /// Target order, when the batch dictates it.
    order: Option<Vec<MemberRef>>,
    /// An existing member's sort value changed.
    needs_sort: bool,
    /// Members updated in place, re-filed in every index at commit.
    merged: Vec<Cid>,
    /// Rejected attributes, with the member that rejected them.
    invalid: Vec<(Option<MemberRef>, ValidationError)>,
}

/// What the commit changed.
#[derive(Default)]
struct Outcome {
    removed: Vec<(MemberRef, usize)>,
    added: Vec<MemberRef>,
    sorted: bool,
    reordered: bool,
}

impl Collection {
    /// Reconciles the collection against `input` with the default options:
    /// unmatched inputs are added, matched ones merged and members missing
    /// from `input` removed.
    pub fn set(&self, input: impl Into<Batch<Input>>) -> Returned {
        self.set_with(input, &SetOptions::set())
    }

    /// Adds `input`, leaving existing members untouched.
    pub fn add(&self, input: impl Into<Batch<Input>>) -> Returned {
        self.set_with(input, &SetOptions::add())
    }

    /// Adds with explicit options, typically [`SetOptions::add`] refined
    /// with `at`, `silent`, `validate` or `parse`.
    pub fn add_with(&self, input: impl Into<Batch<Input>>, options: &SetOptions) -> Returned {
        self.set_with(input, options)
    }

    /// Reconciles the collection against `input`.
    ///
    /// Each input element is matched against the main index. A match is
    /// merged into the existing member when `merge` is set; otherwise a
    /// new member is built and added when `add` is set. With `remove` set,
    /// members no input matched are removed. The result has one slot per
    /// input element, holding the canonical member for it.
    ///
    /// Events are emitted once the collection is consistent again:
    /// `invalid` for every rejected input, then unless `silent` one
    /// `remove` per removed member, one `add` per added member and a
    /// single `sort` if the order changed.
    pub fn set_with(&self, input: impl Into<Batch<Input>>, options: &SetOptions) -> Returned {
        let mut batch = input.into();
        if options.parse {
            if let Some(parser) = &self.shared.config.parser {
                batch = parser(batch);
            }
        }
        let (singular, inputs) = batch.into_parts();

        let mut plan = self.stage(inputs, options);
        let outcome = self.commit(&mut plan, options);
        self.announce(&plan, &outcome, options);

        debug!(
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            merged = plan.merged.len(),
            invalid = plan.invalid.len(),
            sorted = outcome.sorted,
            "reconciled collection"
        );

        Returned::from_parts(singular, plan.slots)
    }

    /// Whether this call keeps the collection sorted.
    fn sortable(&self, options: &SetOptions) -> bool {
        self.shared.config.comparator.is_some() && options.at.is_none() && options.sort_allowed()
    }

    /// Resolves every input without holding the state lock.
    fn stage(&self, inputs: Vec<Input>, options: &SetOptions) -> Plan {
        let sortable = self.sortable(options);
        let sort_attribute = self
            .shared
            .config
            .comparator
            .as_ref()
            .and_then(|comparator| comparator.sort_attribute().map(str::to_string));
        let mut plan = Plan {
            order: (!sortable && options.add && options.remove).then(Vec::new),
            ..Plan::default()
        };

        for input in inputs {
            let slot = plan.slots.len();
            plan.slots.push(None);

            let (existing, attributes) = match input {
                Input::Member(member) => (self.resolve_member(&plan, &member), Err(member)),
                Input::Raw(Value::Map(attributes)) => {
                    (self.resolve_attributes(&plan, &attributes), Ok(attributes))
                }
                Input::Raw(other) => {
                    trace!(kind = other.type_name(), "skipped non-map input");
                    continue;
                }
            };

            let member = if let Some(existing) = existing {
                if options.remove {
                    plan.wanted.insert(existing.cid());
                }
                let accepted = if options.merge {
                    self.merge(&mut plan, &existing, attributes, options, sortable, sort_attribute.as_deref())
                } else {
                    true
                };
                if accepted {
                    plan.slots[slot] = Some(MemberRef::clone(&existing));
                }
                existing
            } else if options.add {
                let Some(member) = self.prepare(attributes, options, &mut plan) else {
                    continue;
                };
                plan.staged_cids.insert(member.cid());
                if let Some(key) = member
                    .get(self.main_index())
                    .filter(Value::is_indexable)
                {
                    plan.staged_keys.insert(key, MemberRef::clone(&member));
                }
                plan.to_add.push((slot, MemberRef::clone(&member)));
                plan.slots[slot] = Some(MemberRef::clone(&member));
                member
            } else {
                continue;
            };

            if let Some(order) = plan.order.as_mut() {
                if !order.iter().any(|m| m.cid() == member.cid()) {
                    order.push(member);
                }
            }
        }

        plan
    }

    /// Finds the member a raw input stands for, live or staged.
    fn resolve_attributes(&self, plan: &Plan, attributes: &Attributes) -> Option<MemberRef> {
        let config = &self.shared.config;
        let id = config
            .model
            .as_ref()
            .and_then(|model| model.generate_id(attributes))
            .or_else(|| attributes.get(config.id_attribute()).cloned())
            .filter(Value::is_indexable)?;

        let live = self.shared.state.read().indexes.lookup(&id).cloned();
        live.or_else(|| plan.staged_keys.get(&id).cloned())
    }

    /// Finds the member a member input stands for, live or staged.
    fn resolve_member(&self, plan: &Plan, member: &MemberRef) -> Option<MemberRef> {
        let live = self.shared.state.read().indexes.resolve(member).cloned();
        live.or_else(|| {
            member
                .get(self.main_index())
                .filter(Value::is_indexable)
                .and_then(|key| plan.staged_keys.get(&key).cloned())
        })
        .or_else(|| {
            plan.staged_cids
                .contains(&member.cid())
                .then(|| MemberRef::clone(member))
        })
    }

    /// Merges an input onto `existing`. Returns false if the member
    /// rejected the attributes.
    fn merge(
        &self,
        plan: &mut Plan,
        existing: &MemberRef,
        input: Result<Attributes, MemberRef>,
        options: &SetOptions,
        sortable: bool,
        sort_attribute: Option<&str>,
    ) -> bool {
        let mut attributes = match input {
            Ok(attributes) => attributes,
            Err(member) if member.cid() == existing.cid() => return true,
            Err(member) => member.attributes(),
        };
        if options.parse {
            attributes = existing.parse(attributes);
        }

        if let Err(error) = existing.set(&attributes, options) {
            plan.invalid.push((Some(MemberRef::clone(existing)), error));
            return false;
        }
        plan.merged.push(existing.cid());
        if sortable && !plan.needs_sort && existing.has_changed(sort_attribute) {
            plan.needs_sort = true;
        }
        true
    }

    /// Turns an unmatched input into a member, or `None` if it is skipped
    /// or rejected.
    fn prepare(
        &self,
        input: Result<Attributes, MemberRef>,
        options: &SetOptions,
        plan: &mut Plan,
    ) -> Option<MemberRef> {
        let member = match input {
            Err(member) => member,
            Ok(attributes) => match &self.shared.config.model {
                Some(model) => model.build(attributes, self, options)?,
                None => Record::new(attributes),
            },
        };

        if options.validate {
            if let Err(error) = member.validate(&member.attributes()) {
                trace!(%error, "rejected new member");
                plan.invalid.push((Some(member), error));
                return None;
            }
        }
        Some(member)
    }

    /// Applies the plan to the sequence and indexes.
    fn commit(&self, plan: &mut Plan, options: &SetOptions) -> Outcome {
        let mut outcome = Outcome::default();
        let mut state = self.shared.state.write();

        if options.remove {
            let unwanted: Vec<Cid> = state
                .members
                .iter()
                .map(|m| m.cid())
                .filter(|cid| !plan.wanted.contains(cid))
                .collect();
            for cid in unwanted {
                if let Some(removed) = self.detach(&mut state, cid) {
                    outcome.removed.push(removed);
                }
            }
        }

        // Silent merges and members without a stream never bridge a change.
        for cid in &plan.merged {
            state.indexes.reindex(*cid);
        }

        for (slot, member) in std::mem::take(&mut plan.to_add) {
            // A handler may have added the same identity while staging ran.
            let occupant = state
                .indexes
                .resolve(&member)
                .filter(|occupant| occupant.cid() != member.cid())
                .cloned();
            if let Some(occupant) = occupant {
                plan.slots[slot] = Some(occupant);
                continue;
            }
            if state.indexes.contains(member.cid()) {
                continue;
            }
            self.add_reference(&mut state, &member);
            outcome.added.push(member);
        }

        let order = plan.order.take().filter(|order| !order.is_empty());
        if !outcome.added.is_empty() || order.is_some() {
            if let Some(at) = options.at {
                let at = at.min(state.members.len());
                state
                    .members
                    .splice(at..at, outcome.added.iter().cloned());
            } else if let Some(order) = order.as_ref() {
                place_in_order(&mut state, order);
            } else {
                state.members.extend(outcome.added.iter().cloned());
            }
            if self.sortable(options) {
                plan.needs_sort = true;
            }
        }
        outcome.reordered = order.is_some();

        if plan.needs_sort {
            if let Some(comparator) = &self.shared.config.comparator {
                comparator.sort(&mut state.members);
                outcome.sorted = true;
            }
        }
        outcome
    }

    /// Emits the events of a committed call.
    fn announce(&self, plan: &Plan, outcome: &Outcome, options: &SetOptions) {
        for (member, error) in &plan.invalid {
            let mut event = Event::new(EventKind::Invalid {
                error: error.clone(),
            })
            .with_collection(self.clone())
            .with_options(options.clone());
            event.member = member.clone();
            self.trigger(&event);
        }

        if options.silent {
            return;
        }
        for (member, index) in &outcome.removed {
            self.notify(member, EventKind::Remove { index: *index }, options);
        }
        for member in &outcome.added {
            self.notify(member, EventKind::Add, options);
        }
        if outcome.sorted || outcome.reordered {
            self.trigger(
                &Event::new(EventKind::Sort)
                    .with_collection(self.clone())
                    .with_options(options.clone()),
            );
        }
    }

    /// Emits a membership event on the collection and on the member.
    pub(super) fn notify(&self, member: &MemberRef, kind: EventKind, options: &SetOptions) {
        let event = Event::new(kind)
            .with_member(MemberRef::clone(member))
            .with_collection(self.clone())
            .with_options(options.clone());
        self.trigger(&event);
        if let Some(events) = member.events() {
            events.trigger(&event);
        }
    }
}

/// Rearranges the sequence to follow `order`.
///
/// Members no longer registered are dropped from `order`; registered
/// members it does not mention keep their relative order after it.
fn place_in_order(state: &mut State, order: &[MemberRef]) {
    let mut placed: HashSet<Cid> = HashSet::with_capacity(order.len());
    let mut members: Vec<MemberRef> = Vec::with_capacity(state.members.len());

    for member in order {
        let cid = member.cid();
        if let Some(registered) = state.indexes.by_cid(cid) {
            if placed.insert(cid) {
                members.push(Arc::clone(registered));
            }
        }
    }
    for member in state.members.drain(..) {
        if placed.insert(member.cid()) {
            members.push(member);
        }
    }
    state.members = members;
}
