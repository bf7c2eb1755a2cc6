//! Handler: the callback unit stored in a [`HandlerSlot`](crate::slot::HandlerSlot)
//!
//! A handler is an opaque, equality-comparable callback. Equality is identity,
//! never behaviour:
//! - `Handler::new` / `Handler::from_arc`: address of the shared `Arc`
//!   allocation. Clones compare equal; two separately wrapped closures never do.
//! - `Handler::bound`: the (instance, method) pair. The method is keyed by the
//!   `TypeId` of its fn item, never by its address: the linker may fold
//!   methods with identical bodies into one address. Binding the same method
//!   to the same instance twice yields equal handlers, which is what duplicate
//!   detection needs for object-owned listeners. Pass the method path itself
//!   (`Type::method`), not a coerced `fn` pointer, or every method with that
//!   signature shares one key.
//!
//! Labels are for diagnostics only and never take part in identity.

use compact_str::CompactString;
use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Callable stored behind every handler.
pub type Callback<A> = dyn Fn(&A) + Send + Sync;

/// Identity of a handler, compared for duplicate detection and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerId {
    /// Address of the callback allocation.
    Callable(usize),

    /// Address of the receiving instance plus the method's fn item type.
    Bound { instance: usize, method: TypeId },
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerId::Callable(addr) => write!(f, "handler@{addr:#x}"),
            HandlerId::Bound { instance, method } => {
                write!(f, "bound handler {method:?}@{instance:#x}")
            }
        }
    }
}

pub struct Handler<A: ?Sized + 'static> {
    id: HandlerId,
    label: Option<CompactString>,
    callback: Arc<Callback<A>>,
}

impl<A: ?Sized + 'static> Handler<A> {
    /// Wrap a closure. Every call allocates a new identity.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self::from_arc(Arc::new(f))
    }

    /// Wrap a shared callable. Handlers built from clones of the same `Arc`
    /// are equal.
    pub fn from_arc(callback: Arc<Callback<A>>) -> Self {
        let addr = Arc::as_ptr(&callback) as *const () as usize;

        Self {
            id: HandlerId::Callable(addr),
            label: None,
            callback,
        }
    }

    /// Bind `method` to `instance`. The handler keeps the instance alive.
    pub fn bound<T, M>(instance: &Arc<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: Fn(&T, &A) + Send + Sync + 'static,
    {
        let id = HandlerId::Bound {
            instance: Arc::as_ptr(instance) as *const () as usize,
            method: TypeId::of::<M>(),
        };
        let receiver = Arc::clone(instance);

        Self {
            id,
            label: None,
            callback: Arc::new(move |args: &A| method(&receiver, args)),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<CompactString>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[inline]
    pub fn call(&self, args: &A) {
        (self.callback)(args);
    }
}

impl<A: ?Sized + 'static> Clone for Handler<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            label: self.label.clone(),
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A: ?Sized + 'static> PartialEq for Handler<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A: ?Sized + 'static> Eq for Handler<A> {}

impl<A: ?Sized + 'static> Hash for Handler<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A: ?Sized + 'static> fmt::Display for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "'{label}' ({})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl<A: ?Sized + 'static> fmt::Debug for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish()
    }
}
