//! Error sinks: where failed slot operations report to
//!
//! Slot operations never panic and never return errors through the non-`try`
//! API; they hand a [`SlotError`] to an optional sink instead. Passing `None`
//! drops the diagnostic.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::SlotError;

pub trait ErrorSink {
    fn report(&mut self, error: &SlotError);
}

impl<F> ErrorSink for F
where
    F: FnMut(&SlotError),
{
    fn report(&mut self, error: &SlotError) {
        self(error)
    }
}

/// Deliver `error` to `sink` when one was supplied.
#[inline]
pub(crate) fn deliver(sink: Option<&mut dyn ErrorSink>, error: &SlotError) {
    if let Some(sink) = sink {
        sink.report(error);
    }
}

/// Adapts a plain message callback (`FnMut(&str)`) into a sink.
pub struct MessageSink<F>(pub F);

impl<F> ErrorSink for MessageSink<F>
where
    F: FnMut(&str),
{
    fn report(&mut self, error: &SlotError) {
        let message = error.to_string();
        (self.0)(&message);
    }
}

/// Keeps every reported error, in order.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    errors: Vec<SlotError>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[SlotError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn last(&self) -> Option<&SlotError> {
        self.errors.last()
    }

    pub fn take(&mut self) -> Vec<SlotError> {
        std::mem::take(&mut self.errors)
    }
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, error: &SlotError) {
        self.errors.push(error.clone());
    }
}

/// Severity used by [`TracingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

/// Forwards slot diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    level: SinkLevel,
    reported: u64,
}

impl TracingSink {
    pub const fn new(level: SinkLevel) -> Self {
        Self { level, reported: 0 }
    }

    pub const fn level(&self) -> SinkLevel {
        self.level
    }

    /// Number of diagnostics forwarded so far.
    pub const fn reported(&self) -> u64 {
        self.reported
    }
}

impl ErrorSink for TracingSink {
    fn report(&mut self, error: &SlotError) {
        self.reported += 1;
        let kind = error.kind();

        match self.level {
            SinkLevel::Debug => debug!(marker = "SLOT_ERROR", ?kind, "{error}"),
            SinkLevel::Info => info!(marker = "SLOT_ERROR", ?kind, "{error}"),
            SinkLevel::Warn => warn!(marker = "SLOT_ERROR", ?kind, "{error}"),
            SinkLevel::Error => error!(marker = "SLOT_ERROR", ?kind, "{error}"),
        }
    }
}
