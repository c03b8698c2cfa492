//! Lifecycle events and the broadcast bus that carries them.
//!
//! Purely observational: events never feed back into the run outcome.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

/// Default capacity of a runner's event bus.
pub(crate) const DEFAULT_BUS_CAPACITY: usize = 64;
