//=========================================================================
// Trigger Collector
//=========================================================================
//
// Drains queued triggers and dispatches them on the loop thread.
//
// Architecture:
//   Receiver<TriggerEvent> → collect_frame(bus) → EventBus::dispatch → TickControl
//
// Bounded draining prevents a flood of triggers from starving updates.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::TriggerEvent;
use crate::core::event_bus::{EventBus, EventKey};

//=== Constants ===========================================================

/// Maximum triggers dispatched in one tick; the rest wait for the next.
pub const MAX_TRIGGERS_PER_TICK: usize = 100;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== TriggerCollector ====================================================

/// Receives triggers from any thread and dispatches them synchronously.
pub(crate) struct TriggerCollector<K: EventKey> {
    receiver: Receiver<TriggerEvent<K>>,
    dispatched_last_frame: usize,
}

impl<K: EventKey> TriggerCollector<K> {
    pub(crate) fn new(receiver: Receiver<TriggerEvent<K>>) -> Self {
        Self {
            receiver,
            dispatched_last_frame: 0,
        }
    }

    /// Dispatches pending triggers (bounded to prevent starvation).
    pub(crate) fn collect_frame(&mut self, bus: &EventBus<K>) -> TickControl {
        self.dispatched_last_frame = 0;

        while self.dispatched_last_frame < MAX_TRIGGERS_PER_TICK {
            match self.receiver.try_recv() {
                Ok(TriggerEvent::Dispatch { key, value }) => {
                    bus.dispatch(&key, value);
                    self.dispatched_last_frame += 1;
                }
                Ok(TriggerEvent::Shutdown) => {
                    debug!("Shutdown trigger received");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if self.dispatched_last_frame >= MAX_TRIGGERS_PER_TICK {
            warn!(
                "Trigger backlog: dispatched {} triggers this frame",
                self.dispatched_last_frame
            );
        }

        TickControl::Continue
    }

    /// Number of triggers dispatched by the last `collect_frame`.
    pub(crate) fn dispatched_last_frame(&self) -> usize {
        self.dispatched_last_frame
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
