//! Event manager for the beacon event system.
//!
//! This module provides the central event manager that handles listener
//! registration, removal, and synchronous event dispatch. The manager is
//! safe against listener re-entrancy: a listener being invoked may register
//! new listeners, remove listeners (including itself), or fire other events
//! recursively. Removals issued during a fire are deferred until the
//! outermost fire returns; listeners registered during a fire do not receive
//! the in-flight event.

use crate::event::event::Event;
use crate::event::listener::{Listener, ListenerStub};
use crate::utils::error::{BeaconError, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// One registered listener together with its identity.
struct ListenerInfo {
    event_id: i32,
    stub: ListenerStub,
    listener: Listener,
}

/// Location of a registered listener: its bucket and position within it.
#[derive(Clone, Copy)]
struct Slot {
    event_id: i32,
    position: usize,
}

#[derive(Default)]
struct ManagerState {
    /// Map of event IDs to listeners, in registration order
    by_id: RefCell<HashMap<i32, Vec<ListenerInfo>>>,
    /// Map of stubs to listener locations
    by_stub: RefCell<HashMap<ListenerStub, Slot>>,
    /// Event IDs whose listeners are queued for removal at depth zero
    pending_remove_ids: RefCell<HashSet<i32>>,
    /// Stubs queued for removal at depth zero
    pending_remove_stubs: RefCell<HashSet<ListenerStub>>,
    /// Count of currently-active fires
    firing_depth: Cell<u32>,
    /// High-water mark of the stub allocator; stubs are never reused
    next_stub: Cell<u64>,
}

impl Drop for ManagerState {
    fn drop(&mut self) {
        debug_assert_eq!(
            self.firing_depth.get(),
            0,
            "event manager dropped while firing"
        );
    }
}

/// Synchronous, re-entrancy-safe event manager.
///
/// Cloning yields another handle to the same manager; that is how listeners
/// get access to the manager from inside their own callbacks. The manager is
/// single-threaded: it is not `Send` or `Sync`, and all registration and
/// dispatch must happen on the thread that created it.
#[derive(Clone)]
pub struct EventManager {
    inner: Rc<ManagerState>,
}

impl EventManager {
    /// Create a new event manager.
    pub fn new() -> Self {
        EventManager {
            inner: Rc::default(),
        }
    }

    /// Register `listener` for `event_id` with an auto-allocated stub.
    ///
    /// The listener is appended after all listeners already registered for
    /// `event_id`. Registration during a fire is allowed; the new listener
    /// does not receive the in-flight event.
    pub fn subscribe(&self, event_id: i32, listener: Listener) -> Result<ListenerStub> {
        let stub = self.alloc_stub();
        self.insert(event_id, listener, stub);
        log::trace!("registered listener {} for event {}", stub, event_id);
        Ok(stub)
    }

    /// Register `listener` for `event_id` under a caller-supplied stub.
    ///
    /// The stub must be valid and unique across all currently-registered
    /// listeners on this manager; otherwise the registration fails with
    /// `InvalidArg` and nothing is overwritten.
    pub fn subscribe_bound(
        &self,
        event_id: i32,
        listener: Listener,
        stub: ListenerStub,
    ) -> Result<ListenerStub> {
        if !stub.is_valid() {
            return Err(BeaconError::InvalidArg(
                "listener stub 0 is reserved".to_string(),
            ));
        }
        if self.inner.by_stub.borrow().contains_key(&stub) {
            return Err(BeaconError::InvalidArg(format!(
                "listener stub {} is already in use",
                stub
            )));
        }
        // Keep the auto allocator ahead of bound stubs so it can never hand
        // out a colliding value later.
        if stub.raw() > self.inner.next_stub.get() {
            self.inner.next_stub.set(stub.raw());
        }
        self.insert(event_id, listener, stub);
        log::trace!("registered listener {} for event {}", stub, event_id);
        Ok(stub)
    }

    /// Remove every listener registered for `event_id`.
    ///
    /// During a fire the removal is deferred: the ID is queued, remaining
    /// listeners for it are skipped by any in-flight walk, and the actual
    /// removal happens when the outermost fire returns. In that case this
    /// returns `Err(Pending)`. An unknown ID fails with `NotFound`, even
    /// during a fire.
    pub fn unsubscribe_event(&self, event_id: i32) -> Result<()> {
        if !self.inner.by_id.borrow().contains_key(&event_id) {
            return Err(BeaconError::NotFound(format!(
                "no listeners for event {}",
                event_id
            )));
        }
        if self.is_firing() {
            self.inner.pending_remove_ids.borrow_mut().insert(event_id);
            log::debug!(
                "deferred removal of listeners for event {} until firing completes",
                event_id
            );
            return Err(BeaconError::Pending);
        }
        self.remove_event_now(event_id);
        Ok(())
    }

    /// Remove the listener identified by `stub`.
    ///
    /// Same deferral contract as [`unsubscribe_event`]: `Err(Pending)` while
    /// firing, `Err(NotFound)` for an unknown stub even while firing. A
    /// listener may remove itself during its own invocation; it still
    /// completes that invocation.
    ///
    /// [`unsubscribe_event`]: EventManager::unsubscribe_event
    pub fn unsubscribe(&self, stub: ListenerStub) -> Result<()> {
        if !self.inner.by_stub.borrow().contains_key(&stub) {
            return Err(BeaconError::NotFound(format!(
                "no listener with stub {}",
                stub
            )));
        }
        if self.is_firing() {
            self.inner.pending_remove_stubs.borrow_mut().insert(stub);
            log::debug!("deferred removal of listener {} until firing completes", stub);
            return Err(BeaconError::Pending);
        }
        self.remove_stub_now(stub);
        Ok(())
    }

    /// As [`unsubscribe`], additionally resetting the caller's stub variable
    /// to the reserved invalid value on immediate success.
    ///
    /// [`unsubscribe`]: EventManager::unsubscribe
    pub fn unsubscribe_clear(&self, stub: &mut ListenerStub) -> Result<()> {
        self.unsubscribe(*stub)?;
        stub.clear();
        Ok(())
    }

    /// Fire `event`, invoking every listener registered for its ID at the
    /// moment this fire began, in registration order.
    ///
    /// Listeners may re-enter the manager freely. Listeners registered after
    /// this fire began are not invoked by it, but a nested fire walks the
    /// tables as they stand when it begins, so a listener added mid-fire for
    /// a different event ID is invoked if that ID is fired recursively.
    /// Firing an ID with no listeners is a no-op.
    ///
    /// The event is consumed; a pool-owned event is released back to its
    /// pool exactly once after dispatch, whether or not any listener ran.
    pub fn fire(&self, mut event: Event) {
        let event_id = event.id();
        self.inner.firing_depth.set(self.inner.firing_depth.get() + 1);
        log::trace!(
            "firing event {} at depth {}",
            event_id,
            self.inner.firing_depth.get()
        );

        // Length snapshot: listeners appended during the walk land past
        // `count`; removals are deferred while firing, so positions 0..count
        // stay stable.
        let count = self
            .inner
            .by_id
            .borrow()
            .get(&event_id)
            .map_or(0, |bucket| bucket.len());
        for position in 0..count {
            let listener = {
                let by_id = self.inner.by_id.borrow();
                let info = &by_id[&event_id][position];
                if self.inner.pending_remove_ids.borrow().contains(&event_id)
                    || self.inner.pending_remove_stubs.borrow().contains(&info.stub)
                {
                    None
                } else {
                    Some(info.listener.clone())
                }
            };
            // No table borrow is held here, so the listener can re-enter.
            if let Some(listener) = listener {
                listener.invoke(&event);
            }
        }

        let depth = self.inner.firing_depth.get() - 1;
        self.inner.firing_depth.set(depth);
        if depth == 0 {
            self.drain_pending();
        }

        if let Some(pool) = event.take_pool() {
            pool.release(event);
        }
    }

    /// Fire a synthesized empty event with the given ID.
    ///
    /// The synthesized event is not pool-owned.
    pub fn fire_id(&self, event_id: i32) {
        self.fire(Event::new(event_id));
    }

    /// Whether a fire is currently in progress on this manager.
    pub fn is_firing(&self) -> bool {
        self.inner.firing_depth.get() > 0
    }

    /// Number of listeners currently registered for `event_id`.
    pub fn listener_count(&self, event_id: i32) -> usize {
        self.inner
            .by_id
            .borrow()
            .get(&event_id)
            .map_or(0, |bucket| bucket.len())
    }

    /// Total number of listeners across all event IDs.
    pub fn total_listener_count(&self) -> usize {
        self.inner.by_id.borrow().values().map(|b| b.len()).sum()
    }

    fn alloc_stub(&self) -> ListenerStub {
        let raw = self.inner.next_stub.get() + 1;
        self.inner.next_stub.set(raw);
        ListenerStub::from_raw(raw)
    }

    fn insert(&self, event_id: i32, listener: Listener, stub: ListenerStub) {
        let mut by_id = self.inner.by_id.borrow_mut();
        let bucket = by_id.entry(event_id).or_insert_with(Vec::new);
        bucket.push(ListenerInfo {
            event_id,
            stub,
            listener,
        });
        let position = bucket.len() - 1;
        self.inner
            .by_stub
            .borrow_mut()
            .insert(stub, Slot { event_id, position });
    }

    fn remove_event_now(&self, event_id: i32) {
        let bucket = self.inner.by_id.borrow_mut().remove(&event_id);
        if let Some(bucket) = bucket {
            {
                let mut by_stub = self.inner.by_stub.borrow_mut();
                for info in &bucket {
                    debug_assert_eq!(info.event_id, event_id);
                    by_stub.remove(&info.stub);
                }
            }
            log::debug!("removed {} listeners for event {}", bucket.len(), event_id);
            // `bucket` drops here, outside all table borrows, running any
            // external handler destructors.
        }
    }

    fn remove_stub_now(&self, stub: ListenerStub) {
        let slot = match self.inner.by_stub.borrow_mut().remove(&stub) {
            Some(slot) => slot,
            None => return,
        };
        let mut removed = None;
        {
            let mut by_id = self.inner.by_id.borrow_mut();
            let mut now_empty = false;
            if let Some(bucket) = by_id.get_mut(&slot.event_id) {
                debug_assert_eq!(bucket[slot.position].stub, stub);
                removed = Some(bucket.remove(slot.position));
                // Entries after the removed one shift down a position.
                let mut by_stub = self.inner.by_stub.borrow_mut();
                for info in bucket.iter().skip(slot.position) {
                    if let Some(s) = by_stub.get_mut(&info.stub) {
                        s.position -= 1;
                    }
                }
                now_empty = bucket.is_empty();
            }
            if now_empty {
                by_id.remove(&slot.event_id);
            }
        }
        if removed.is_some() {
            log::trace!("removed listener {}", stub);
        }
        // `removed` drops here, outside all table borrows.
    }

    /// Apply removals deferred during a fire: stubs first, then event IDs.
    /// Runs exactly once per outermost fire, after its last listener returns.
    fn drain_pending(&self) {
        let stubs: Vec<ListenerStub> = self
            .inner
            .pending_remove_stubs
            .borrow_mut()
            .drain()
            .collect();
        for stub in stubs {
            self.remove_stub_now(stub);
        }
        let ids: Vec<i32> = self.inner.pending_remove_ids.borrow_mut().drain().collect();
        for event_id in ids {
            self.remove_event_now(event_id);
        }
    }
}

impl Default for EventManager {
    fn default() -> Self {
        EventManager::new()
    }
}
