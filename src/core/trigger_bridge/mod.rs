//=========================================================================
// Trigger Bridge
//=========================================================================
//
// Bridges threads that fire gameplay events with the loop thread that
// owns dispatch. The bus itself is thread-safe; routing external
// triggers through one queue keeps every dispatch on a single thread,
// serialized with spawner ticks.
//
// Components:
// - `interface`: Trigger types, sender handle and error definitions
// - `event_collector`: Loop-side draining and dispatch
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Public API ==========================================================

pub(crate) use event_collector::TriggerCollector;
pub use event_collector::{TickControl, MAX_TRIGGERS_PER_TICK};
pub use interface::{EngineError, TriggerEvent, TriggerSender};
