//! Event definitions for the beacon event system.
//!
//! An event is a plain value: an integer event ID plus an opaque payload.
//! The payload format is caller-defined; the manager never inspects it.
//! Events drawn from an object pool carry a pool handle and are handed back
//! to the pool by the dispatcher after dispatch.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Release target for events drawn from an object pool.
///
/// The party that dispatches a pool-owned event must hand it back to its
/// pool exactly once after dispatch; [`EventManager::fire`] does so for any
/// event carrying a pool handle, whether or not a listener ran. The event
/// passed to `release` no longer carries the handle.
///
/// [`EventManager::fire`]: crate::event::manager::EventManager::fire
pub trait EventPool {
    /// Take back ownership of a spent event.
    fn release(&self, event: Event);
}

/// Event structure containing event data.
pub struct Event {
    /// ID of the event, used to select the listeners to invoke
    id: i32,
    /// Opaque payload, if any
    payload: Option<Box<dyn Any>>,
    /// Pool this event was drawn from, if any
    pool: Option<Rc<dyn EventPool>>,
    /// Timestamp when the event was created
    created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new empty event with the given ID.
    pub fn new(id: i32) -> Self {
        Event {
            id,
            payload: None,
            pool: None,
            created_at: Utc::now(),
        }
    }

    /// Create an event carrying a payload.
    pub fn with_payload<T: Any>(id: i32, payload: T) -> Self {
        let mut event = Event::new(id);
        event.payload = Some(Box::new(payload));
        event
    }

    /// The event ID this event is routed by.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Typed view of the payload, if one is present and of type `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref())
    }

    /// Replace the payload.
    pub fn set_payload<T: Any>(&mut self, payload: T) {
        self.payload = Some(Box::new(payload));
    }

    /// When this event object was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mark this event as drawn from `pool`. The dispatcher releases it back
    /// there after dispatch.
    pub fn attach_pool(&mut self, pool: Rc<dyn EventPool>) {
        self.pool = Some(pool);
    }

    /// Whether this event will be returned to a pool after dispatch.
    pub fn is_pool_owned(&self) -> bool {
        self.pool.is_some()
    }

    /// Detach the pool handle, if any, so `release` is called exactly once.
    pub(crate) fn take_pool(&mut self) -> Option<Rc<dyn EventPool>> {
        self.pool.take()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("has_payload", &self.payload.is_some())
            .field("pool_owned", &self.pool.is_some())
            .field("created_at", &self.created_at)
            .finish()
    }
}
