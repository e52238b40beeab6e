//=========================================================================
// Core Systems Orchestrator
//
// Central coordinator for gameplay systems running on the logic thread.
//
// Responsibilities:
// - Own the gameplay event bus and every registered system
// - Dispatch triggers queued from other threads (one tick at a time)
// - Update systems with a fixed timestep
// - Tear systems down exactly once when the loop ends
//
// Notes:
// Everything that touches a system happens on one thread: queued
// triggers are dispatched first, then systems update. Other threads only
// talk to the loop through the trigger channel.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::any::Any;
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use crossbeam_channel::Receiver;
use log::{debug, info, trace};

//=== Internal Modules ====================================================
use event_bus::{EventBus, EventKey};
use trigger_bridge::{TickControl, TriggerCollector, TriggerEvent};

pub mod config;
pub mod event_bus;
pub mod spawner;
pub mod timer;
pub mod trigger_bridge;

//=== System Trait ========================================================

/// Something the engine updates every tick.
///
/// Only `update()` is required. `shutdown()` runs once when the loop
/// ends and must unsubscribe from the bus before releasing anything else.
pub trait System: Send {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "system"
    }

    /// Advances the system by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Releases subscriptions and schedules. Must be idempotent.
    fn shutdown(&mut self) {}
}

//=== Panic Payloads ======================================================

/// Best-effort message from a caught panic payload.
pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

//=== CoreSystemsOrchestrator =============================================

/// Owns the bus, the trigger queue and the systems for one logic loop.
pub(crate) struct CoreSystemsOrchestrator<K: EventKey> {
    bus: EventBus<K>,
    collector: TriggerCollector<K>,
    systems: Vec<Box<dyn System>>,
    torn_down: bool,
}

impl<K: EventKey> CoreSystemsOrchestrator<K> {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(bus: EventBus<K>, receiver: Receiver<TriggerEvent<K>>) -> Self {
        Self {
            bus,
            collector: TriggerCollector::new(receiver),
            systems: Vec::new(),
            torn_down: false,
        }
    }

    pub(crate) fn add_system(&mut self, system: Box<dyn System>) {
        debug!("Registered system {:?}", system.name());
        self.systems.push(system);
    }

    pub(crate) fn system_count(&self) -> usize {
        self.systems.len()
    }

    //--- tick() ----------------------------------------------------------
    //
    // One logic step:
    //  1. Dispatch queued triggers on the bus
    //  2. Update every system with the fixed timestep
    //
    pub(crate) fn tick(&mut self, dt: f32) -> TickControl {
        if self.torn_down {
            return TickControl::Exit;
        }

        if let TickControl::Exit = self.collector.collect_frame(&self.bus) {
            return TickControl::Exit;
        }
        trace!(
            "Dispatched {} trigger(s) this tick",
            self.collector.dispatched_last_frame()
        );

        for system in &mut self.systems {
            system.update(dt);
        }

        TickControl::Continue
    }

    //--- teardown() ------------------------------------------------------
    //
    // Shuts every system down once, in registration order.
    //
    pub(crate) fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        for system in &mut self.systems {
            debug!("Shutting down system {:?}", system.name());
            system.shutdown();
        }
        info!("All systems shut down");
    }

    //--- run_loop() ------------------------------------------------------
    //
    // Ticks at a fixed rate (TPS) on the current thread until a shutdown
    // trigger arrives or every sender is gone, then tears down.
    //
    pub(crate) fn run_loop(mut self, tps: f64) {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);
        let dt = frame_duration.as_secs_f32();

        info!("Core loop running at {} TPS", tps);

        loop {
            let frame_start = Instant::now();

            if let TickControl::Exit = self.tick(dt) {
                info!("Core loop exiting.");
                break;
            }

            // Maintain deterministic pacing
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        self.teardown();
    }

    //--- spawn_core_thread() ---------------------------------------------
    pub(crate) fn spawn_core_thread(self, tps: f64) -> thread::JoinHandle<()> {
        thread::spawn(move || self.run_loop(tps))
    }
}

impl<K: EventKey> Drop for CoreSystemsOrchestrator<K> {
    fn drop(&mut self) {
        self.teardown();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
