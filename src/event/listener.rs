//! Event listener definitions for the beacon event system.
//!
//! A listener is a callable invoked synchronously when a matching event
//! fires. The manager accepts three shapes: a free function, an owned
//! closure, or an external object implementing [`EventListener`]. Each
//! registered listener is identified by a [`ListenerStub`].

use crate::event::event::Event;
use std::fmt;
use std::rc::Rc;

/// Opaque handle to one registered listener.
///
/// Stubs are allocated from a strictly-increasing counter starting at 1 and
/// are never reused within the lifetime of a manager, even after removal.
/// The zero value is reserved as "invalid" and is never allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerStub(u64);

impl ListenerStub {
    /// The reserved invalid stub.
    pub const INVALID: ListenerStub = ListenerStub(0);

    /// Construct a stub from a raw value. Zero yields the invalid stub.
    pub fn from_raw(raw: u64) -> Self {
        ListenerStub(raw)
    }

    /// The raw integer value of this stub.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Whether this stub is a valid (non-reserved) handle.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Reset this stub to the reserved invalid value.
    pub(crate) fn clear(&mut self) {
        self.0 = 0;
    }
}

impl Default for ListenerStub {
    fn default() -> Self {
        ListenerStub::INVALID
    }
}

impl fmt::Display for ListenerStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability implemented by external listener objects.
///
/// Ownership of the object transfers to the manager on registration; its
/// `Drop` runs when the manager removes it. `invoke` takes `&self` because a
/// nested fire may re-enter the same listener; interior mutability is the
/// implementor's concern.
pub trait EventListener {
    /// Consume one event.
    fn invoke(&self, event: &Event);
}

/// A registered callable in one of the three accepted shapes.
#[derive(Clone)]
pub enum Listener {
    /// A free function.
    Func(fn(&Event)),
    /// An owned closure (covers callables bound to an object).
    Closure(Rc<dyn Fn(&Event)>),
    /// An external listener object, owned by the manager.
    Handler(Rc<dyn EventListener>),
}

impl Listener {
    /// Wrap a free function.
    pub fn from_fn(f: fn(&Event)) -> Self {
        Listener::Func(f)
    }

    /// Wrap a closure.
    pub fn from_closure<F>(f: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Listener::Closure(Rc::new(f))
    }

    /// Take ownership of an external listener object.
    pub fn from_handler<H>(handler: H) -> Self
    where
        H: EventListener + 'static,
    {
        Listener::Handler(Rc::new(handler))
    }

    /// Invoke this listener with `event`.
    pub(crate) fn invoke(&self, event: &Event) {
        match self {
            Listener::Func(f) => f(event),
            Listener::Closure(f) => f(event),
            Listener::Handler(h) => h.invoke(event),
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Func(_) => f.write_str("Listener::Func"),
            Listener::Closure(_) => f.write_str("Listener::Closure"),
            Listener::Handler(_) => f.write_str("Listener::Handler"),
        }
    }
}
