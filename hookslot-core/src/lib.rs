//! # hookslot - multicast handler slots
//!
//! A slot holds an ordered set of callbacks that fire together. Listeners are
//! added and removed through [`HandlerRegistry`] with identity-aware duplicate
//! detection; misuse is reported to an optional [`ErrorSink`] instead of
//! panicking.
//!
//! ## Example
//! ```rust
//! use hookslot_core::{CollectingSink, Handler, HandlerRegistry, HandlerSlot};
//!
//! let mut on_hit: HandlerSlot<u32> = HandlerSlot::new();
//! let log = Handler::new(|damage: &u32| println!("took {damage}"));
//! let mut errors = CollectingSink::new();
//!
//! HandlerRegistry::add_if_absent(&mut on_hit, log.clone(), Some(&mut errors));
//! HandlerRegistry::add_if_absent(&mut on_hit, log.clone(), Some(&mut errors));
//! assert_eq!(on_hit.len(), 1);
//! assert_eq!(errors.len(), 1);
//!
//! on_hit.invoke(&12);
//! HandlerRegistry::remove_all(&mut on_hit, Some(&mut errors));
//! assert!(on_hit.is_empty());
//! ```

pub mod error;

pub mod handler;
pub use handler::{Callback, Handler, HandlerId};

pub mod slot;
pub use slot::{HandlerSlot, SlotLimits, Units};

pub mod sink;
pub use sink::{CollectingSink, ErrorSink, MessageSink, SinkLevel, TracingSink};

pub mod registry;
pub use registry::{HandlerRegistry, RemovePolicy};

pub mod shared;
pub use shared::SharedSlot;

pub mod table;
pub use table::EventTable;

pub mod config;

pub mod logging;
pub use logging::{LoggerBuilder, LoggerConfig};

pub use error::{AppError, SlotError, SlotErrorKind, SlotResult};
