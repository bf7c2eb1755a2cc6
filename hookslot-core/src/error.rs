//! src/error.rs
//! ============================================================================
//! # Error types for handler slots and the surrounding application
//!
//! [`SlotError`] is the recoverable taxonomy produced by slot operations. It
//! is cheap to clone so sinks can keep copies. [`AppError`] covers the
//! ambient layer (config files, logging setup) and wraps `SlotError` when a
//! caller decides a slot failure should abort.

use compact_str::CompactString;
use std::{io, path::PathBuf};
use thiserror::Error;

pub type SlotResult<T> = Result<T, SlotError>;

/// Coarse classification of a [`SlotError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotErrorKind {
    Validation,
    Duplicate,
    EmptySource,
    Composition,
    NotFound,
}

/// Recoverable failures of slot operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("nil handler: an add-if-absent call requires a handler")]
    NilHandler,

    #[error("duplicate add: {handler} is already registered in this slot")]
    DuplicateHandler { handler: CompactString },

    #[error("empty source: the slot has no handlers to remove")]
    EmptySource,

    #[error("handler composition failed: {reason}")]
    Composition { reason: CompactString },

    #[error("remove failed: {handler} is not registered in this slot")]
    HandlerNotFound { handler: CompactString },
}

impl SlotError {
    #[inline]
    pub const fn kind(&self) -> SlotErrorKind {
        match self {
            SlotError::NilHandler => SlotErrorKind::Validation,
            SlotError::DuplicateHandler { .. } => SlotErrorKind::Duplicate,
            SlotError::EmptySource => SlotErrorKind::EmptySource,
            SlotError::Composition { .. } => SlotErrorKind::Composition,
            SlotError::HandlerNotFound { .. } => SlotErrorKind::NotFound,
        }
    }

    /// Every slot error is an expected misuse the owner can recover from.
    #[inline(always)]
    pub const fn is_recoverable(&self) -> bool {
        true
    }

    #[inline]
    pub fn duplicate(handler: impl std::fmt::Display) -> Self {
        Self::DuplicateHandler {
            handler: CompactString::from(handler.to_string()),
        }
    }

    #[inline]
    pub fn not_found(handler: impl std::fmt::Display) -> Self {
        Self::HandlerNotFound {
            handler: CompactString::from(handler.to_string()),
        }
    }

    #[inline]
    pub fn composition(reason: impl Into<CompactString>) -> Self {
        Self::Composition {
            reason: reason.into(),
        }
    }

    /// Composition failure for a slot that would grow past its unit limit.
    #[inline]
    pub fn capacity_exceeded(max_units: usize) -> Self {
        Self::composition(format!("slot is limited to {max_units} handler(s)"))
    }
}

/// Errors of the application layer around the slots.
#[derive(Debug, Error)]
pub enum AppError {
    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not determine the config directory")]
    ConfigDirUnavailable,

    #[error(transparent)]
    Logging(#[from] crate::logging::LoggingError),

    #[error("Handler slot error: {0}")]
    Slot(#[from] SlotError),
}

impl AppError {
    pub fn config_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(SlotError::NilHandler.kind(), SlotErrorKind::Validation);
        assert_eq!(SlotError::duplicate("h").kind(), SlotErrorKind::Duplicate);
        assert_eq!(SlotError::EmptySource.kind(), SlotErrorKind::EmptySource);
        assert_eq!(
            SlotError::capacity_exceeded(2).kind(),
            SlotErrorKind::Composition
        );
        assert_eq!(SlotError::not_found("h").kind(), SlotErrorKind::NotFound);
    }

    #[test]
    fn test_messages_carry_handler_description() {
        let err = SlotError::duplicate("on_damage");
        assert!(err.to_string().contains("on_damage"));
        assert!(err.to_string().starts_with("duplicate add"));

        let err = SlotError::capacity_exceeded(3);
        assert!(err.to_string().contains("limited to 3"));
    }

    #[test]
    fn test_slot_error_converts_into_app_error() {
        let app: AppError = SlotError::EmptySource.into();
        assert!(matches!(app, AppError::Slot(SlotError::EmptySource)));
        assert_eq!(
            app.to_string(),
            "Handler slot error: empty source: the slot has no handlers to remove"
        );
    }

    #[test]
    fn test_logging_error_is_transparent() {
        let app: AppError = crate::logging::LoggingError::AlreadyInitialized.into();
        assert!(matches!(app, AppError::Logging(_)));
        assert_eq!(app.to_string(), "Logger already initialized");
    }
}
