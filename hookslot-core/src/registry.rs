//! HandlerRegistry: add/remove operations over caller-owned handler slots
//!
//! The registry holds no state. Every operation borrows a [`HandlerSlot`] for
//! one call and returns immediately:
//! - `add_unconditional`: append, duplicates allowed
//! - `add_if_absent`: append unless the handler is already present
//! - `remove` / `remove_if_exists`: drop the first matching occurrence
//! - `remove_all`: drop every unit present at call time, one by one
//!
//! Each operation comes in a `try_*` form returning [`SlotResult`] and a sink
//! form that never fails from the caller's point of view: errors go to the
//! optional [`ErrorSink`] and the slot is left as it was.
//!
//! Operations on one slot are not synchronized. `&mut` access already rules
//! out unsynchronized sharing; owners that share a slot across threads wrap it
//! in [`SharedSlot`](crate::shared::SharedSlot) or their own lock.

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::handler::Handler;
use crate::sink::{ErrorSink, deliver};
use crate::slot::HandlerSlot;

/// What removing an absent handler means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovePolicy {
    /// Absent handler is a successful no-op.
    #[default]
    Silent,

    /// Absent handler is reported as [`SlotError::HandlerNotFound`].
    Reported,
}

/// Stateless operations over [`HandlerSlot`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerRegistry;

impl HandlerRegistry {
    /* ------------------------------ add --------------------------------- */

    pub fn try_add_unconditional<A>(
        slot: &mut HandlerSlot<A>,
        unit: Handler<A>,
    ) -> SlotResult<()>
    where
        A: ?Sized + 'static,
    {
        slot.combine(unit)
    }

    /// Append `unit` even if it is already present; both occurrences fire.
    pub fn add_unconditional<A>(
        slot: &mut HandlerSlot<A>,
        unit: Handler<A>,
        sink: Option<&mut dyn ErrorSink>,
    ) where
        A: ?Sized + 'static,
    {
        if let Err(e) = Self::try_add_unconditional(slot, unit) {
            deliver(sink, &e);
        }
    }

    pub fn try_add_if_absent<A>(
        slot: &mut HandlerSlot<A>,
        unit: impl Into<Option<Handler<A>>>,
    ) -> SlotResult<()>
    where
        A: ?Sized + 'static,
    {
        let unit = unit.into().ok_or(SlotError::NilHandler)?;

        // Nothing to scan.
        if slot.is_empty() {
            return slot.combine(unit);
        }

        let mut units = slot.decompose();
        if units.contains(&unit) {
            return Err(SlotError::duplicate(&unit));
        }

        units.push(unit);
        *slot = HandlerSlot::compose(units, slot.limits())?;
        Ok(())
    }

    /// Append `unit` unless it is already present. `None` is reported as a
    /// nil handler.
    pub fn add_if_absent<A>(
        slot: &mut HandlerSlot<A>,
        unit: impl Into<Option<Handler<A>>>,
        sink: Option<&mut dyn ErrorSink>,
    ) where
        A: ?Sized + 'static,
    {
        if let Err(e) = Self::try_add_if_absent(slot, unit) {
            deliver(sink, &e);
        }
    }

    /* ----------------------------- remove ------------------------------- */

    pub fn try_remove<A>(
        slot: &mut HandlerSlot<A>,
        unit: &Handler<A>,
        policy: RemovePolicy,
    ) -> SlotResult<()>
    where
        A: ?Sized + 'static,
    {
        if slot.is_empty() {
            return Err(SlotError::EmptySource);
        }

        let mut units = slot.decompose();
        let Some(index) = units.iter().position(|u| u == unit) else {
            return match policy {
                RemovePolicy::Silent => Ok(()),
                RemovePolicy::Reported => Err(SlotError::not_found(unit)),
            };
        };

        units.remove(index);
        *slot = HandlerSlot::compose(units, slot.limits())?;
        Ok(())
    }

    pub fn remove_with_policy<A>(
        slot: &mut HandlerSlot<A>,
        unit: &Handler<A>,
        policy: RemovePolicy,
        sink: Option<&mut dyn ErrorSink>,
    ) where
        A: ?Sized + 'static,
    {
        if let Err(e) = Self::try_remove(slot, unit, policy) {
            deliver(sink, &e);
        }
    }

    /// Remove the first occurrence of `unit`; an absent unit is not an error.
    pub fn remove<A>(
        slot: &mut HandlerSlot<A>,
        unit: &Handler<A>,
        sink: Option<&mut dyn ErrorSink>,
    ) where
        A: ?Sized + 'static,
    {
        Self::remove_with_policy(slot, unit, RemovePolicy::Silent, sink);
    }

    /// Remove the first occurrence of `unit`; an absent unit is reported.
    pub fn remove_if_exists<A>(
        slot: &mut HandlerSlot<A>,
        unit: &Handler<A>,
        sink: Option<&mut dyn ErrorSink>,
    ) where
        A: ?Sized + 'static,
    {
        Self::remove_with_policy(slot, unit, RemovePolicy::Reported, sink);
    }

    /* --------------------------- remove all ----------------------------- */

    /// Attempt every removal, handing each failure to `on_error`.
    ///
    /// The sweep holds `&mut` throughout, so every snapshot unit is still
    /// present when its turn comes and only an empty slot reaches `on_error`.
    /// Duplicates are removed one occurrence per snapshot entry.
    fn remove_each<A>(slot: &mut HandlerSlot<A>, mut on_error: impl FnMut(SlotError)) -> usize
    where
        A: ?Sized + 'static,
    {
        if slot.is_empty() {
            on_error(SlotError::EmptySource);
            return 0;
        }

        let snapshot = slot.decompose();
        let mut removed = 0;

        for unit in &snapshot {
            match Self::try_remove(slot, unit, RemovePolicy::Reported) {
                Ok(()) => removed += 1,
                Err(e) => on_error(e),
            }
        }

        removed
    }

    /// Returns the number of units removed, or the first failure after every
    /// unit has been attempted.
    pub fn try_remove_all<A>(slot: &mut HandlerSlot<A>) -> SlotResult<usize>
    where
        A: ?Sized + 'static,
    {
        let mut first_error = None;
        let removed = Self::remove_each(slot, |e| {
            first_error.get_or_insert(e);
        });

        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    /// Like [`remove_all`](Self::remove_all), returning the failures instead
    /// of reporting them so the caller can deliver them after releasing its
    /// lock on the slot.
    pub(crate) fn remove_all_collecting<A>(slot: &mut HandlerSlot<A>) -> Vec<SlotError>
    where
        A: ?Sized + 'static,
    {
        let mut errors = Vec::new();
        Self::remove_each(slot, |e| errors.push(e));
        errors
    }

    /// Best-effort removal of every unit present at call time. Each failed
    /// removal is reported on its own and does not stop the rest.
    pub fn remove_all<A>(slot: &mut HandlerSlot<A>, mut sink: Option<&mut dyn ErrorSink>)
    where
        A: ?Sized + 'static,
    {
        Self::remove_each(slot, |e| {
            if let Some(sink) = sink.as_mut() {
                sink.report(&e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotErrorKind;
    use crate::sink::CollectingSink;
    use crate::slot::SlotLimits;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn unit(log: &Log, name: &'static str) -> Handler<()> {
        let log = Arc::clone(log);
        Handler::new(move |_| log.lock().push(name)).with_label(name)
    }

    fn kinds(sink: &CollectingSink) -> Vec<SlotErrorKind> {
        sink.errors().iter().map(SlotError::kind).collect()
    }

    #[test]
    fn test_round_trip_of_adds_with_duplicates() {
        let log = Log::default();
        let (a, b, c) = (unit(&log, "a"), unit(&log, "b"), unit(&log, "c"));
        let sequence = [a.clone(), b.clone(), a.clone(), c.clone(), b.clone()];

        let mut slot = HandlerSlot::new();
        let mut sink = CollectingSink::new();
        for u in &sequence {
            HandlerRegistry::add_unconditional(&mut slot, u.clone(), Some(&mut sink));
        }

        assert!(sink.is_empty());
        assert_eq!(slot.decompose().as_slice(), &sequence);

        slot.invoke(&());
        assert_eq!(*log.lock(), vec!["a", "b", "a", "c", "b"]);
    }

    #[test]
    fn test_add_if_absent_is_idempotent() {
        let log = Log::default();
        let u = unit(&log, "u");
        let other = unit(&log, "other");

        let mut slot = HandlerSlot::new();
        let mut sink = CollectingSink::new();
        HandlerRegistry::add_if_absent(&mut slot, other.clone(), Some(&mut sink));
        HandlerRegistry::add_if_absent(&mut slot, u.clone(), Some(&mut sink));
        assert!(sink.is_empty());

        HandlerRegistry::add_if_absent(&mut slot, u.clone(), Some(&mut sink));
        assert_eq!(slot.occurrences(&u), 1);
        assert_eq!(slot.len(), 2);
        assert_eq!(kinds(&sink), vec![SlotErrorKind::Duplicate]);
    }

    #[test]
    fn test_add_if_absent_duplicate_on_sole_unit() {
        let u: Handler<()> = Handler::new(|_| {});
        let mut slot = HandlerSlot::new();

        assert!(HandlerRegistry::try_add_if_absent(&mut slot, u.clone()).is_ok());
        let err = HandlerRegistry::try_add_if_absent(&mut slot, u.clone()).unwrap_err();
        assert_eq!(err, SlotError::duplicate(&u));
        assert_eq!(slot.len(), 1);
    }

    #[test]
    fn test_nil_handler_is_rejected() {
        let log = Log::default();
        let mut slot: HandlerSlot<()> = HandlerSlot::new();
        let mut sink = CollectingSink::new();

        HandlerRegistry::add_if_absent(&mut slot, None::<Handler<()>>, Some(&mut sink));
        assert!(slot.is_empty());

        HandlerRegistry::add_unconditional(&mut slot, unit(&log, "a"), None);
        let before = slot.clone();
        HandlerRegistry::add_if_absent(&mut slot, None::<Handler<()>>, Some(&mut sink));

        assert_eq!(slot, before);
        assert_eq!(
            kinds(&sink),
            vec![SlotErrorKind::Validation, SlotErrorKind::Validation]
        );
    }

    #[test]
    fn test_remove_all_restores_emptiness() {
        let u: Handler<()> = Handler::new(|_| {});
        let mut slot = HandlerSlot::new();
        let mut sink = CollectingSink::new();

        HandlerRegistry::add_if_absent(&mut slot, u, Some(&mut sink));
        HandlerRegistry::remove_all(&mut slot, Some(&mut sink));

        assert!(slot.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_remove_all_clears_duplicates() {
        let log = Log::default();
        let (a, b) = (unit(&log, "a"), unit(&log, "b"));
        let mut slot =
            HandlerSlot::compose([a.clone(), b, a], SlotLimits::UNBOUNDED).unwrap();

        assert_eq!(HandlerRegistry::try_remove_all(&mut slot), Ok(3));
        assert!(slot.is_empty());
    }

    #[test]
    fn test_remove_all_sweep_only_fails_on_empty_slot() {
        let log = Log::default();
        let a = unit(&log, "a");
        let mut slot =
            HandlerSlot::compose([a.clone(), a.clone(), a], SlotLimits::UNBOUNDED).unwrap();

        assert!(HandlerRegistry::remove_all_collecting(&mut slot).is_empty());
        assert!(slot.is_empty());
        assert_eq!(
            HandlerRegistry::remove_all_collecting(&mut slot),
            vec![SlotError::EmptySource]
        );
    }

    #[test]
    fn test_remove_preserves_order() {
        let log = Log::default();
        let (u1, u2, u3) = (unit(&log, "u1"), unit(&log, "u2"), unit(&log, "u3"));
        let mut slot = HandlerSlot::new();

        for u in [&u1, &u2, &u3] {
            HandlerRegistry::add_if_absent(&mut slot, u.clone(), None);
        }
        HandlerRegistry::remove(&mut slot, &u2, None);

        assert_eq!(slot.decompose().as_slice(), &[u1, u3]);
    }

    #[test]
    fn test_remove_takes_first_occurrence_only() {
        let log = Log::default();
        let (a, b) = (unit(&log, "a"), unit(&log, "b"));
        let mut slot =
            HandlerSlot::compose([a.clone(), b.clone(), a.clone()], SlotLimits::UNBOUNDED)
                .unwrap();

        HandlerRegistry::remove_if_exists(&mut slot, &a, None);
        assert_eq!(slot.units(), &[b, a]);
    }

    #[test]
    fn test_empty_source_is_reported() {
        let u: Handler<()> = Handler::new(|_| {});
        let mut slot: HandlerSlot<()> = HandlerSlot::new();
        let mut sink = CollectingSink::new();

        HandlerRegistry::remove_all(&mut slot, Some(&mut sink));
        HandlerRegistry::remove(&mut slot, &u, Some(&mut sink));
        HandlerRegistry::remove_if_exists(&mut slot, &u, Some(&mut sink));

        assert!(slot.is_empty());
        assert_eq!(kinds(&sink), vec![SlotErrorKind::EmptySource; 3]);
        assert_eq!(
            HandlerRegistry::try_remove_all(&mut slot),
            Err(SlotError::EmptySource)
        );
    }

    #[test]
    fn test_remove_policies_differ_on_absent_handler() {
        let log = Log::default();
        let (present, absent) = (unit(&log, "present"), unit(&log, "absent"));
        let mut slot = HandlerSlot::new();
        HandlerRegistry::add_if_absent(&mut slot, present.clone(), None);

        let mut sink = CollectingSink::new();
        HandlerRegistry::remove(&mut slot, &absent, Some(&mut sink));
        assert!(sink.is_empty());

        HandlerRegistry::remove_if_exists(&mut slot, &absent, Some(&mut sink));
        assert_eq!(kinds(&sink), vec![SlotErrorKind::NotFound]);
        assert!(sink.errors()[0].to_string().contains("absent"));
        assert_eq!(slot.units(), &[present]);
    }

    #[test]
    fn test_composition_failure_leaves_slot_unchanged() {
        let log = Log::default();
        let (a, b) = (unit(&log, "a"), unit(&log, "b"));
        let mut slot = HandlerSlot::with_limits(SlotLimits::bounded(1));
        let mut sink = CollectingSink::new();

        HandlerRegistry::add_unconditional(&mut slot, a.clone(), Some(&mut sink));
        HandlerRegistry::add_unconditional(&mut slot, a.clone(), Some(&mut sink));
        HandlerRegistry::add_if_absent(&mut slot, b, Some(&mut sink));

        assert_eq!(slot.units(), &[a]);
        assert_eq!(
            kinds(&sink),
            vec![SlotErrorKind::Composition, SlotErrorKind::Composition]
        );
    }

    #[test]
    fn test_zero_limit_rejects_fast_path() {
        let mut slot: HandlerSlot<()> = HandlerSlot::with_limits(SlotLimits::bounded(0));
        let u: Handler<()> = Handler::new(|_| {});
        let result = HandlerRegistry::try_add_if_absent(&mut slot, u);
        assert!(matches!(result, Err(SlotError::Composition { .. })));
        assert!(slot.is_empty());
    }

    #[test]
    fn test_independent_slots_do_not_interfere() {
        let log = Log::default();
        let u = unit(&log, "shared");
        let mut first = HandlerSlot::new();
        let mut second = HandlerSlot::new();

        HandlerRegistry::add_if_absent(&mut first, u.clone(), None);
        HandlerRegistry::add_if_absent(&mut second, u.clone(), None);
        HandlerRegistry::remove_all(&mut first, None);

        assert!(first.is_empty());
        assert_eq!(second.units(), &[u]);
    }

    #[test]
    fn test_slot_cycles_between_empty_and_occupied() {
        let u: Handler<()> = Handler::new(|_| {});
        let mut slot = HandlerSlot::new();
        let mut sink = CollectingSink::new();

        for _ in 0..3 {
            HandlerRegistry::add_if_absent(&mut slot, u.clone(), Some(&mut sink));
            assert_eq!(slot.len(), 1);
            HandlerRegistry::remove_if_exists(&mut slot, &u, Some(&mut sink));
            assert!(slot.is_empty());
        }
        assert!(sink.is_empty());
    }
}
