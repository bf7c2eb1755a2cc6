//! HandlerSlot: caller-owned storage for one composite handler
//!
//! A slot is either empty or an ordered run of [`Handler`] units that fire in
//! insertion order. It is mutated through
//! [`HandlerRegistry`](crate::registry::HandlerRegistry); the slot itself only
//! knows how to compose, decompose and invoke.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{SlotError, SlotResult};
use crate::handler::Handler;

/// Most slots hold a handful of listeners.
pub type Units<A> = SmallVec<[Handler<A>; 4]>;

/// Composition limits applied whenever a slot grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotLimits {
    /// Maximum number of units (duplicates included). `None` = unbounded.
    pub max_units: Option<usize>,
}

impl SlotLimits {
    pub const UNBOUNDED: Self = Self { max_units: None };

    #[must_use]
    pub const fn bounded(max_units: usize) -> Self {
        Self {
            max_units: Some(max_units),
        }
    }

    #[inline]
    fn check(&self, len: usize) -> SlotResult<()> {
        match self.max_units {
            Some(max) if len > max => Err(SlotError::capacity_exceeded(max)),
            _ => Ok(()),
        }
    }
}

pub struct HandlerSlot<A: ?Sized + 'static> {
    units: Units<A>,
    limits: SlotLimits,
}

impl<A: ?Sized + 'static> HandlerSlot<A> {
    /// Empty, unbounded slot.
    pub fn new() -> Self {
        Self::with_limits(SlotLimits::UNBOUNDED)
    }

    pub fn with_limits(limits: SlotLimits) -> Self {
        Self {
            units: SmallVec::new(),
            limits,
        }
    }

    /// Rebuild a slot from an ordered sequence of units.
    pub fn compose<I>(units: I, limits: SlotLimits) -> SlotResult<Self>
    where
        I: IntoIterator<Item = Handler<A>>,
    {
        let units: Units<A> = units.into_iter().collect();
        limits.check(units.len())?;

        Ok(Self { units, limits })
    }

    /// Ordered copy of the units. `compose(slot.decompose(), slot.limits())`
    /// reproduces the slot.
    pub fn decompose(&self) -> Units<A> {
        self.units.clone()
    }

    #[inline]
    pub fn limits(&self) -> SlotLimits {
        self.limits
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Handler<A>] {
        &self.units
    }

    pub fn contains(&self, handler: &Handler<A>) -> bool {
        self.position(handler).is_some()
    }

    /// Index of the first occurrence of `handler`.
    pub fn position(&self, handler: &Handler<A>) -> Option<usize> {
        self.units.iter().position(|unit| unit == handler)
    }

    pub fn occurrences(&self, handler: &Handler<A>) -> usize {
        self.units.iter().filter(|unit| *unit == handler).count()
    }

    /// Call every unit in order. Returns how many ran.
    pub fn invoke(&self, args: &A) -> usize {
        for unit in &self.units {
            unit.call(args);
        }
        self.units.len()
    }

    /// Drop every unit without reporting.
    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// Append `unit`. On failure the slot is unchanged.
    pub(crate) fn combine(&mut self, unit: Handler<A>) -> SlotResult<()> {
        self.limits.check(self.units.len() + 1)?;
        self.units.push(unit);
        Ok(())
    }
}

impl<A: ?Sized + 'static> Default for HandlerSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> Clone for HandlerSlot<A> {
    fn clone(&self) -> Self {
        Self {
            units: self.units.clone(),
            limits: self.limits,
        }
    }
}

impl<A: ?Sized + 'static> PartialEq for HandlerSlot<A> {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
    }
}

impl<A: ?Sized + 'static> Eq for HandlerSlot<A> {}

impl<A: ?Sized + 'static> std::fmt::Debug for HandlerSlot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("units", &self.units)
            .field("limits", &self.limits)
            .finish()
    }
}
