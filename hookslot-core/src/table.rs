//! EventTable: explicit key -> handler slot dispatch table
//!
//! Owners that expose several events keep one [`HandlerSlot`] per stable key
//! instead of resolving callbacks dynamically. Slots are created on first
//! subscription and pruned as soon as they become empty, so `len()` is the
//! number of keys with at least one listener.

use indexmap::IndexMap;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::error::SlotError;
use crate::handler::Handler;
use crate::registry::{HandlerRegistry, RemovePolicy};
use crate::sink::{ErrorSink, deliver};
use crate::slot::{HandlerSlot, SlotLimits};

pub struct EventTable<K, A: ?Sized + 'static> {
    slots: IndexMap<K, HandlerSlot<A>>,
    limits: SlotLimits,
}

impl<K, A> EventTable<K, A>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
    A: ?Sized + 'static,
{
    pub fn new() -> Self {
        Self::with_limits(SlotLimits::UNBOUNDED)
    }

    /// Every slot created by this table uses `limits`.
    pub fn with_limits(limits: SlotLimits) -> Self {
        Self {
            slots: IndexMap::new(),
            limits,
        }
    }

    fn slot_mut(&mut self, key: &K) -> &mut HandlerSlot<A> {
        if !self.slots.contains_key(key) {
            debug!(?key, "creating handler slot");
        }

        let limits = self.limits;
        self.slots
            .entry(key.clone())
            .or_insert_with(|| HandlerSlot::with_limits(limits))
    }

    fn prune(&mut self, key: &K) {
        if self.slots.get(key).is_some_and(HandlerSlot::is_empty) {
            self.slots.shift_remove(key);
            debug!(?key, "pruned empty handler slot");
        }
    }

    /// Add `handler` under `key` unless it is already subscribed there.
    pub fn subscribe(
        &mut self,
        key: &K,
        handler: impl Into<Option<Handler<A>>>,
        sink: Option<&mut dyn ErrorSink>,
    ) {
        let Some(handler) = handler.into() else {
            // A nil handler must not leave an empty slot behind.
            deliver(sink, &SlotError::NilHandler);
            return;
        };

        HandlerRegistry::add_if_absent(self.slot_mut(key), handler, sink);
        self.prune(key);
    }

    /// Add `handler` under `key` even if it is already subscribed.
    pub fn subscribe_unchecked(
        &mut self,
        key: &K,
        handler: Handler<A>,
        sink: Option<&mut dyn ErrorSink>,
    ) {
        HandlerRegistry::add_unconditional(self.slot_mut(key), handler, sink);
        self.prune(key);
    }

    /// Remove one occurrence of `handler` from `key`. An unknown key behaves
    /// like an empty slot.
    pub fn unsubscribe(
        &mut self,
        key: &K,
        handler: &Handler<A>,
        policy: RemovePolicy,
        sink: Option<&mut dyn ErrorSink>,
    ) {
        match self.slots.get_mut(key) {
            Some(slot) => HandlerRegistry::remove_with_policy(slot, handler, policy, sink),
            None => deliver(sink, &SlotError::EmptySource),
        }
        self.prune(key);
    }

    /// Remove every handler under `key`.
    pub fn clear(&mut self, key: &K, sink: Option<&mut dyn ErrorSink>) {
        match self.slots.get_mut(key) {
            Some(slot) => HandlerRegistry::remove_all(slot, sink),
            None => deliver(sink, &SlotError::EmptySource),
        }
        self.prune(key);
    }

    /// Invoke the handlers under `key`. Returns how many ran.
    pub fn emit(&self, key: &K, args: &A) -> usize {
        let fired = self.slots.get(key).map_or(0, |slot| slot.invoke(args));
        trace!(?key, fired, "emitted");
        fired
    }

    pub fn slot(&self, key: &K) -> Option<&HandlerSlot<A>> {
        self.slots.get(key)
    }

    pub fn listener_count(&self, key: &K) -> usize {
        self.slots.get(key).map_or(0, HandlerSlot::len)
    }

    /// Keys with at least one listener, in first-subscription order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.slots.keys()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K, A> Default for EventTable<K, A>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
    A: ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: std::fmt::Debug, A: ?Sized + 'static> std::fmt::Debug for EventTable<K, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(k, slot)| (k, slot.len())))
            .finish()
    }
}
