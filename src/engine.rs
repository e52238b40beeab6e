//=========================================================================
// Quackmageddon Engine
//
// Host loop that drives gameplay systems and routes external triggers.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──spawn()──>  EngineHandle
//         │                          │                       │
//         ├─ with_tps()              ├─ event_bus()          ├─ triggers()
//         ├─ with_channel_capacity() ├─ trigger_sender()     └─ shutdown()
//         └─ from_config()           ├─ add_system()
//                                    ├─ step(dt)   (cooperative)
//                                    └─ run()      (blocking)
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Sender};
use log::{debug, error, info};

//=== Internal Dependencies ===============================================

use crate::core::config::EngineConfig;
use crate::core::event_bus::{EventBus, EventKey};
use crate::core::trigger_bridge::{EngineError, TickControl, TriggerEvent, TriggerSender};
use crate::core::{panic_reason, CoreSystemsOrchestrator, System};

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic updates per second)
/// - **Channel capacity**: 128 triggers
///
/// # Examples
///
/// ```no_run
/// use quackmageddon::EngineBuilder;
/// use quackmageddon::core::event_bus::GameplayEvent;
///
/// let engine = EngineBuilder::<GameplayEvent>::new()
///     .with_tps(30.0)
///     .with_channel_capacity(64)
///     .build();
///
/// let handle = engine.spawn();
/// handle.triggers().dispatch_default(GameplayEvent::PauseSpawning).ok();
/// handle.shutdown().ok();
/// ```
pub struct EngineBuilder<K: EventKey> {
    tps: f64,
    channel_capacity: usize,
    bus: Option<EventBus<K>>,
}

impl<K: EventKey> EngineBuilder<K> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        let defaults = EngineConfig::default();
        Self {
            tps: defaults.tps,
            channel_capacity: defaults.channel_capacity,
            bus: None,
        }
    }

    /// Creates a builder from loaded configuration.
    ///
    /// # Panics
    ///
    /// Panics on values that [`EngineConfig::validate`] would reject.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new()
            .with_tps(config.tps)
            .with_channel_capacity(config.channel_capacity)
    }

    /// Sets the target ticks per second for the logic loop.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the trigger channel capacity.
    ///
    /// Triggers sent while the queue is full are rejected, never blocked.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Uses an existing bus instead of creating a fresh one.
    pub fn with_event_bus(mut self, bus: EventBus<K>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine<K> {
        info!(
            "Building engine (TPS: {}, channel: {})",
            self.tps, self.channel_capacity
        );

        let bus = self.bus.unwrap_or_default();
        let (sender, receiver) = bounded(self.channel_capacity);

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(bus.clone(), receiver),
            bus,
            sender,
            tps: self.tps,
            channel_capacity: self.channel_capacity,
        }
    }
}

impl<K: EventKey> Default for EngineBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Gameplay runtime: one event bus, one trigger queue, many systems.
///
/// Create via [`EngineBuilder`]. Drive it cooperatively with
/// [`step`](Self::step), block on [`run`](Self::run), or move the loop to
/// a background thread with [`spawn`](Self::spawn).
pub struct Engine<K: EventKey> {
    orchestrator: CoreSystemsOrchestrator<K>,
    bus: EventBus<K>,
    sender: Sender<TriggerEvent<K>>,
    tps: f64,
    channel_capacity: usize,
}

impl<K: EventKey> Engine<K> {
    //--- Initialization ---------------------------------------------------

    /// Returns a handle to the engine's bus for subscribing systems.
    pub fn event_bus(&self) -> EventBus<K> {
        self.bus.clone()
    }

    /// Returns a sender for firing events from any thread.
    pub fn trigger_sender(&self) -> TriggerSender<K> {
        TriggerSender::new(self.sender.clone())
    }

    /// Registers a system; systems update in registration order.
    pub fn add_system<T>(mut self, system: T) -> Self
    where
        T: System + 'static,
    {
        self.orchestrator.add_system(Box::new(system));
        self
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    pub fn system_count(&self) -> usize {
        self.orchestrator.system_count()
    }

    //--- Execution --------------------------------------------------------

    /// Runs a single tick on the calling thread.
    ///
    /// Returns [`TickControl::Exit`] once a shutdown trigger was seen; the
    /// systems are torn down at that point and later steps do nothing.
    pub fn step(&mut self, dt: f32) -> TickControl {
        let control = self.orchestrator.tick(dt);
        if control == TickControl::Exit {
            self.orchestrator.teardown();
        }
        control
    }

    /// Runs the fixed-rate loop on the calling thread.
    ///
    /// Blocks until a shutdown trigger arrives or every [`TriggerSender`]
    /// has been dropped.
    pub fn run(self) {
        info!("Starting engine loop (TPS: {})", self.tps);

        let Engine {
            orchestrator,
            sender,
            tps,
            ..
        } = self;

        // The loop must be able to observe disconnection
        drop(sender);
        orchestrator.run_loop(tps);

        info!("Engine shutdown complete");
    }

    /// Moves the loop to a background thread.
    pub fn spawn(self) -> EngineHandle<K> {
        info!("Spawning engine loop thread (TPS: {})", self.tps);

        let Engine {
            orchestrator,
            bus,
            sender,
            tps,
            ..
        } = self;

        let join = orchestrator.spawn_core_thread(tps);

        EngineHandle {
            triggers: TriggerSender::new(sender),
            bus,
            join,
        }
    }
}

//=== EngineHandle ========================================================

/// Handle to an engine running on a background thread.
pub struct EngineHandle<K: EventKey> {
    triggers: TriggerSender<K>,
    bus: EventBus<K>,
    join: JoinHandle<()>,
}

impl<K: EventKey> EngineHandle<K> {
    /// Sender for firing events into the running loop.
    pub fn triggers(&self) -> &TriggerSender<K> {
        &self.triggers
    }

    /// The bus the loop dispatches on.
    pub fn event_bus(&self) -> EventBus<K> {
        self.bus.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Requests shutdown and waits for the loop thread to finish.
    ///
    /// If the trigger queue is full, waits for the loop to make room.
    /// Systems are torn down on the loop thread before this returns.
    pub fn shutdown(self) -> Result<(), EngineError> {
        // A closed channel means the loop is already exiting
        if self.triggers.shutdown_blocking().is_err() {
            debug!("Trigger channel already closed, joining core thread");
        }

        match self.join.join() {
            Ok(()) => {
                info!("Core thread terminated cleanly");
                Ok(())
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                error!("Core thread panicked: {}", reason);
                Err(EngineError::CoreThreadPanicked(reason))
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
