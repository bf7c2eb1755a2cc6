//! SharedSlot: a handler slot that several owners can mutate across threads
//!
//! [`HandlerRegistry`] leaves synchronization to the owner. `SharedSlot` is
//! that owner-side lock: each operation holds the mutex for exactly one
//! decompose-mutate-recompose cycle, so interleaved writers cannot lose
//! updates. The lock is released before anything outside the slot runs:
//! diagnostics reach the sink after the mutation, and invocation calls a
//! snapshot of the units. Sinks and handlers may therefore use the same slot.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::SlotResult;
use crate::handler::Handler;
use crate::registry::{HandlerRegistry, RemovePolicy};
use crate::sink::{ErrorSink, deliver};
use crate::slot::{HandlerSlot, SlotLimits, Units};

pub struct SharedSlot<A: ?Sized + 'static> {
    inner: Arc<Mutex<HandlerSlot<A>>>,
}

impl<A: ?Sized + 'static> SharedSlot<A> {
    pub fn new() -> Self {
        Self::from_slot(HandlerSlot::new())
    }

    pub fn with_limits(limits: SlotLimits) -> Self {
        Self::from_slot(HandlerSlot::with_limits(limits))
    }

    pub fn from_slot(slot: HandlerSlot<A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(slot)),
        }
    }

    pub fn try_add_unconditional(&self, unit: Handler<A>) -> SlotResult<()> {
        HandlerRegistry::try_add_unconditional(&mut *self.inner.lock(), unit)
    }

    pub fn add_unconditional(&self, unit: Handler<A>, sink: Option<&mut dyn ErrorSink>) {
        if let Err(e) = self.try_add_unconditional(unit) {
            deliver(sink, &e);
        }
    }

    pub fn try_add_if_absent(&self, unit: impl Into<Option<Handler<A>>>) -> SlotResult<()> {
        HandlerRegistry::try_add_if_absent(&mut *self.inner.lock(), unit)
    }

    pub fn add_if_absent(
        &self,
        unit: impl Into<Option<Handler<A>>>,
        sink: Option<&mut dyn ErrorSink>,
    ) {
        if let Err(e) = self.try_add_if_absent(unit) {
            deliver(sink, &e);
        }
    }

    pub fn try_remove(&self, unit: &Handler<A>, policy: RemovePolicy) -> SlotResult<()> {
        HandlerRegistry::try_remove(&mut *self.inner.lock(), unit, policy)
    }

    pub fn remove_with_policy(
        &self,
        unit: &Handler<A>,
        policy: RemovePolicy,
        sink: Option<&mut dyn ErrorSink>,
    ) {
        if let Err(e) = self.try_remove(unit, policy) {
            deliver(sink, &e);
        }
    }

    pub fn remove(&self, unit: &Handler<A>, sink: Option<&mut dyn ErrorSink>) {
        self.remove_with_policy(unit, RemovePolicy::Silent, sink);
    }

    pub fn remove_if_exists(&self, unit: &Handler<A>, sink: Option<&mut dyn ErrorSink>) {
        self.remove_with_policy(unit, RemovePolicy::Reported, sink);
    }

    pub fn remove_all(&self, mut sink: Option<&mut dyn ErrorSink>) {
        let errors = HandlerRegistry::remove_all_collecting(&mut *self.inner.lock());
        if let Some(sink) = sink.as_mut() {
            for e in &errors {
                sink.report(e);
            }
        }
    }

    /// Call the units present at call time, outside the lock.
    pub fn invoke(&self, args: &A) -> usize {
        let snapshot = self.snapshot();
        for unit in &snapshot {
            unit.call(args);
        }
        snapshot.len()
    }

    pub fn snapshot(&self) -> Units<A> {
        self.inner.lock().decompose()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn contains(&self, unit: &Handler<A>) -> bool {
        self.inner.lock().contains(unit)
    }
}

impl<A: ?Sized + 'static> Clone for SharedSlot<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ?Sized + 'static> Default for SharedSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> std::fmt::Debug for SharedSlot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSlot")
            .field("len", &self.len())
            .finish()
    }
}
