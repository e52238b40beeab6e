//=========================================================================
// Enemy Spawner
//=========================================================================
//
// Timed, pausable producer that throws enemies toward a target.
//
// Architecture:
//   EventBus ──PauseSpawning──►  paused = true
//            ──ResumeSpawning─►  paused = false
//
//   update(dt) → RepeatingTimer::advance → tick() × fires
//                                            │
//                       paused? ── yes ──► no-op
//                                            │ no
//                plan_spawn() → EntityPool::spawn → EntityConfigurator
//
// States: Running ⇄ Paused (pause / resume events). Both accept ticks.
//
// Teardown unregisters both listeners before stopping the timer, so no
// dispatch can reach a spawner that is halfway torn down.
//
//=========================================================================

//=== Module Declarations =================================================

mod collaborators;
pub mod geometry;

//=== External Dependencies ===============================================

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fastrand::Rng;
use glam::Vec3;
use log::{debug, error, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::config::{ConfigError, SpawnerConfig};
use crate::core::event_bus::{EventBus, GameplayEvent, ListenerId};
use crate::core::timer::RepeatingTimer;
use crate::core::{panic_reason, System};
use geometry::{
    circle_point, facing_direction, look_rotation, sample_angle_degrees, sample_range,
};

//=== Public API ==========================================================

pub use collaborators::{CameraHandle, EntityConfigurator, EntityPool, PoolError};
pub use geometry::{SpawnPlan, FALLBACK_DIRECTION};

//=== SpawnerState ========================================================

/// Whether ticks currently spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerState {
    Running,
    Paused,
}

//=== TickOutcome =========================================================

/// What a single `tick()` did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Spawner is paused; no collaborator was called.
    Paused,

    /// An enemy was spawned and configured.
    Spawned(SpawnPlan),

    /// The pool refused; configuration was skipped for this tick.
    PoolFailed(PoolError),

    /// The pool or configurator panicked; the schedule keeps running.
    CollaboratorPanicked(String),
}

//=== SpawnerStats ========================================================

/// Running counters kept by a spawner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnerStats {
    pub spawned: u64,
    pub pool_failures: u64,
    pub collaborator_panics: u64,
}

//=== SpawnerError ========================================================

/// Errors from constructing or scheduling a spawner.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnerError {
    /// `start` was called while a schedule is already active.
    AlreadyStarted,

    /// The spawner was shut down and cannot be restarted.
    ShutDown,

    /// Start delay is negative or not finite.
    InvalidDelay(f32),

    /// The configuration failed validation.
    InvalidConfig(ConfigError),
}

impl std::fmt::Display for SpawnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "Spawner schedule already started"),
            Self::ShutDown => write!(f, "Spawner has been shut down"),
            Self::InvalidDelay(d) => write!(f, "Invalid start delay: {}", d),
            Self::InvalidConfig(e) => write!(f, "Invalid spawner config: {}", e),
        }
    }
}

impl std::error::Error for SpawnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

//=== EnemySpawner ========================================================

struct SpawnerListeners {
    pause: ListenerId,
    resume: ListenerId,
}

/// Periodically spawns enemies on a circle around the facing target.
///
/// Listens to [`GameplayEvent::PauseSpawning`] and
/// [`GameplayEvent::ResumeSpawning`] on the bus it was created with.
///
/// # Lifecycle
///
/// 1. **Construction**: `new()` validates the config and registers listeners
/// 2. **Start**: `start(delay)` arms the single repeating schedule
/// 3. **Updates**: `update(dt)` from the host loop runs due ticks
/// 4. **Teardown**: `shutdown()` (or drop) unregisters, then stops
pub struct EnemySpawner<P, C>
where
    P: EntityPool,
    C: EntityConfigurator<P::Handle>,
{
    config: SpawnerConfig,
    bus: EventBus<GameplayEvent>,
    pool: P,
    configurator: C,
    camera: CameraHandle,
    paused: Arc<AtomicBool>,
    listeners: Option<SpawnerListeners>,
    timer: Option<RepeatingTimer>,
    rng: Rng,
    stats: SpawnerStats,
}

impl<P, C> EnemySpawner<P, C>
where
    P: EntityPool,
    C: EntityConfigurator<P::Handle>,
{
    //--- Construction -----------------------------------------------------

    /// Creates a spawner and subscribes it to pause/resume events.
    ///
    /// The schedule is not armed until [`start`](Self::start) is called.
    pub fn new(
        config: SpawnerConfig,
        bus: EventBus<GameplayEvent>,
        pool: P,
        configurator: C,
        camera: CameraHandle,
    ) -> Result<Self, SpawnerError> {
        config.validate().map_err(SpawnerError::InvalidConfig)?;

        let paused = Arc::new(AtomicBool::new(false));

        let pause = {
            let paused = Arc::clone(&paused);
            bus.register(GameplayEvent::PauseSpawning, move |_| {
                paused.store(true, Ordering::SeqCst);
                debug!("Spawning paused");
            })
        };
        let resume = {
            let paused = Arc::clone(&paused);
            bus.register(GameplayEvent::ResumeSpawning, move |_| {
                paused.store(false, Ordering::SeqCst);
                debug!("Spawning resumed");
            })
        };

        info!(
            "Spawner ready: tag={:?}, every {}s, radius={}, altitude={}",
            config.entity_tag, config.interval_seconds, config.spawn_radius, config.spawn_altitude
        );

        Ok(Self {
            config,
            bus,
            pool,
            configurator,
            camera,
            paused,
            listeners: Some(SpawnerListeners { pause, resume }),
            timer: None,
            rng: Rng::new(),
            stats: SpawnerStats::default(),
        })
    }

    /// Reseeds the sampler so spawns are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::with_seed(seed);
        self
    }

    //--- Scheduling -------------------------------------------------------

    /// Arms the repeating schedule: first tick after `delay` seconds, then
    /// every `interval_seconds`.
    ///
    /// Only one schedule exists per spawner; a second call is rejected.
    pub fn start(&mut self, delay: f32) -> Result<(), SpawnerError> {
        if self.listeners.is_none() {
            return Err(SpawnerError::ShutDown);
        }
        if self.timer.is_some() {
            warn!("Spawner already started, ignoring second start");
            return Err(SpawnerError::AlreadyStarted);
        }
        if !(delay.is_finite() && delay >= 0.0) {
            return Err(SpawnerError::InvalidDelay(delay));
        }

        debug!(
            "Starting spawn schedule (delay {}s, interval {}s)",
            delay, self.config.interval_seconds
        );
        self.timer = Some(RepeatingTimer::new(delay, self.config.interval_seconds));
        Ok(())
    }

    /// Starts with the configured initial delay.
    pub fn start_default(&mut self) -> Result<(), SpawnerError> {
        self.start(self.config.initial_delay_seconds)
    }

    /// Disarms the schedule. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
            debug!("Spawn schedule stopped");
        }
    }

    /// Advances the schedule by `dt` seconds and runs every due tick.
    pub fn update(&mut self, dt: f32) {
        let fires = match self.timer.as_mut() {
            Some(timer) => timer.advance(dt),
            None => return,
        };

        for _ in 0..fires {
            self.tick();
        }
    }

    //--- Spawning ---------------------------------------------------------

    /// Spawns one enemy unless paused.
    ///
    /// Pool failures and collaborator panics are logged and reported in
    /// the outcome; they never propagate.
    pub fn tick(&mut self) -> TickOutcome {
        if self.is_paused() {
            return TickOutcome::Paused;
        }

        let plan = self.plan_spawn();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let entity =
                self.pool
                    .spawn(&self.config.entity_tag, plan.position, plan.orientation)?;
            self.configurator.set_velocity(&entity, plan.velocity);
            self.configurator.set_look_at(&entity, self.camera);
            Ok::<(), PoolError>(())
        }));

        match result {
            Ok(Ok(())) => {
                self.stats.spawned += 1;

                trace!(
                    "Spawned {:?} at {:?} with velocity {:?}",
                    self.config.entity_tag,
                    plan.position,
                    plan.velocity
                );
                TickOutcome::Spawned(plan)
            }
            Ok(Err(e)) => {
                self.stats.pool_failures += 1;
                warn!("Skipping spawn this tick: {}", e);
                TickOutcome::PoolFailed(e)
            }
            Err(payload) => {
                self.stats.collaborator_panics += 1;
                let reason = panic_reason(payload.as_ref());
                error!("Spawn collaborator panicked: {}", reason);
                TickOutcome::CollaboratorPanicked(reason)
            }
        }
    }

    /// Samples the next spawn without touching any collaborator.
    pub fn plan_spawn(&mut self) -> SpawnPlan {
        let angle_degrees = sample_angle_degrees(&mut self.rng);
        let position = circle_point(
            self.config.spawn_radius,
            self.config.spawn_altitude,
            angle_degrees,
        );

        if position == self.config.facing_target {
            debug!("Spawn point coincides with facing target, using fallback direction");
        }
        let direction = facing_direction(position, self.config.facing_target);

        let speed = sample_range(&mut self.rng, self.config.min_power, self.config.max_power);

        SpawnPlan {
            angle_degrees,
            position,
            direction,
            orientation: look_rotation(direction, Vec3::Y),
            speed,
            velocity: direction * speed,
        }
    }

    //--- Teardown ---------------------------------------------------------

    /// Unregisters both listeners, then stops the schedule.
    ///
    /// Idempotent. A shut down spawner cannot be started again.
    pub fn shutdown(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            self.bus
                .unregister(&GameplayEvent::PauseSpawning, listeners.pause);
            self.bus
                .unregister(&GameplayEvent::ResumeSpawning, listeners.resume);
            info!("Spawner {:?} unsubscribed", self.config.entity_tag);
        }
        self.stop();
    }

    //--- Queries ----------------------------------------------------------

    /// True while a pause event is in effect.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Current pause state as an enum.
    pub fn state(&self) -> SpawnerState {
        if self.is_paused() {
            SpawnerState::Paused
        } else {
            SpawnerState::Running
        }
    }

    /// True while a spawn schedule is armed.
    pub fn is_started(&self) -> bool {
        self.timer.is_some()
    }

    /// True once `shutdown` has unregistered the listeners.
    pub fn is_shut_down(&self) -> bool {
        self.listeners.is_none()
    }

    /// Counters for spawns and contained failures.
    pub fn stats(&self) -> SpawnerStats {
        self.stats
    }

    /// The validated configuration.
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Camera handed to every spawned entity.
    pub fn camera(&self) -> CameraHandle {
        self.camera
    }

    /// The entity pool collaborator.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// The entity configurator collaborator.
    pub fn configurator(&self) -> &C {
        &self.configurator
    }
}

impl<P, C> Drop for EnemySpawner<P, C>
where
    P: EntityPool,
    C: EntityConfigurator<P::Handle>,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

//--- System Integration --------------------------------------------------

impl<P, C> System for EnemySpawner<P, C>
where
    P: EntityPool,
    C: EntityConfigurator<P::Handle>,
{
    fn name(&self) -> &str {
        "enemy_spawner"
    }

    fn update(&mut self, dt: f32) {
        EnemySpawner::update(self, dt);
    }

    fn shutdown(&mut self) {
        EnemySpawner::shutdown(self);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
