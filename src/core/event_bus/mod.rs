//=========================================================================
// Event Bus Module
//=========================================================================
//
// Gameplay event publish/subscribe.
//
// Components:
// - `event_bus`: the bus itself (register / unregister / dispatch)
// - `listener_list`: ordered per-key listener storage
// - `gameplay_event`: closed catalog of gameplay event keys
//
//=========================================================================

//=== Module Declarations =================================================

#[allow(clippy::module_inception)]
mod event_bus;
mod gameplay_event;
mod listener_list;

//=== Public API ==========================================================

pub use event_bus::EventBus;
pub use gameplay_event::{GameplayEvent, UnknownEventError};

/// Numeric payload carried by every dispatch.
pub type EventValue = i32;

/// Payload used when the caller has nothing to report.
pub const DEFAULT_EVENT_VALUE: EventValue = 0;

//=== EventKey ============================================================

/// Marker trait for event keys.
///
/// Automatically implemented for every hashable, debuggable, sendable
/// type, so the bus works with [`GameplayEvent`] as well as plain strings.
pub trait EventKey: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + 'static {}

// Blanket implementation
impl<T> EventKey for T where T: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + 'static {}

//=== ListenerId ==========================================================

/// Token returned by [`EventBus::register`].
///
/// Pass it back to [`EventBus::unregister`] to remove exactly that
/// registration. Tokens are unique per bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    /// Raw numeric value, mostly useful for logging.
    pub fn raw(self) -> u64 {
        self.0
    }
}
