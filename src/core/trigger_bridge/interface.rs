//=========================================================================
// Trigger Bridge Interface
//=========================================================================
//
// Cross-thread trigger types (events, sender and errors).
//
// Defines the contract between code that fires gameplay events from
// other threads and the loop thread that owns dispatch.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Sender, TrySendError};
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::event_bus::{EventKey, EventValue, DEFAULT_EVENT_VALUE};

//=== TriggerEvent ========================================================

/// Messages queued for the loop thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent<K: EventKey> {
    /// Dispatch `key` with `value` on the next tick.
    Dispatch { key: K, value: EventValue },

    /// Stop the loop after tearing systems down.
    Shutdown,
}

//=== EngineError =========================================================

/// Runtime errors surfaced to the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The loop is gone; nothing will receive the trigger.
    ChannelClosed,

    /// The trigger queue is full.
    ChannelFull,

    /// The loop thread panicked.
    CoreThreadPanicked(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChannelClosed => write!(f, "Trigger channel closed"),
            Self::ChannelFull => write!(f, "Trigger channel full"),
            Self::CoreThreadPanicked(e) => write!(f, "Core thread panicked: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

//=== TriggerSender =======================================================

/// Cloneable handle for firing events into a running engine.
///
/// Triggers never block: if the queue is full the trigger is rejected
/// with [`EngineError::ChannelFull`].
pub struct TriggerSender<K: EventKey> {
    sender: Sender<TriggerEvent<K>>,
}

impl<K: EventKey> TriggerSender<K> {
    pub(crate) fn new(sender: Sender<TriggerEvent<K>>) -> Self {
        Self { sender }
    }

    /// Queues `key` for dispatch with `value`.
    pub fn dispatch(&self, key: K, value: EventValue) -> Result<(), EngineError> {
        self.send(TriggerEvent::Dispatch { key, value })
    }

    /// Queues `key` for dispatch with the default payload.
    pub fn dispatch_default(&self, key: K) -> Result<(), EngineError> {
        self.dispatch(key, DEFAULT_EVENT_VALUE)
    }

    /// Asks the loop to tear down and exit.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.send(TriggerEvent::Shutdown)
    }

    /// Queues a shutdown, waiting for room if the queue is full.
    ///
    /// The loop drains the queue every tick, so the wait is bounded by a
    /// tick while the loop is alive.
    pub(crate) fn shutdown_blocking(&self) -> Result<(), EngineError> {
        self.sender
            .send(TriggerEvent::Shutdown)
            .map_err(|_| EngineError::ChannelClosed)
    }

    fn send(&self, event: TriggerEvent<K>) -> Result<(), EngineError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(event) => {
                warn!("Trigger queue full, dropping {:?}", event);
                EngineError::ChannelFull
            }
            TrySendError::Disconnected(_) => EngineError::ChannelClosed,
        })
    }
}

impl<K: EventKey> Clone for TriggerSender<K> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
