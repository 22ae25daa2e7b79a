//! Beacon: a synchronous, in-process event manager.
//!
//! Events are integer-identified messages carrying an opaque payload.
//! Callers register listeners for an event ID and receive an opaque stub
//! handle; firing an event invokes every listener registered for its ID, in
//! registration order, on the calling thread. Dispatch is re-entrancy-safe:
//! a listener may register listeners, remove listeners (including itself),
//! or fire other events recursively. Removals issued during a fire are
//! deferred until the outermost fire returns.
//!
//! ```
//! use beacon::{Event, EventManager, Listener};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let manager = EventManager::new();
//! let hits = Rc::new(Cell::new(0));
//!
//! let seen = hits.clone();
//! let stub = manager
//!     .subscribe(7, Listener::from_closure(move |_event| seen.set(seen.get() + 1)))
//!     .unwrap();
//!
//! manager.fire(Event::with_payload(7, "hello".to_string()));
//! assert_eq!(hits.get(), 1);
//!
//! manager.unsubscribe(stub).unwrap();
//! ```

pub mod common;
pub mod config;
pub mod event;
pub mod utils;

pub use config::ConfigManager;
pub use config::EventRegistry;
pub use event::Event;
pub use event::EventListener;
pub use event::EventManager;
pub use event::EventPool;
pub use event::Listener;
pub use event::ListenerStub;
pub use utils::error::BeaconError;
pub use utils::error::Result;

use std::path::Path;

/// Load and validate an event registry from a JSON or YAML file.
pub fn init<P: AsRef<Path>>(path: P) -> Result<EventRegistry> {
    ConfigManager::load_registry(path)
}
