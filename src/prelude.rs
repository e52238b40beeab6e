//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use quackmageddon::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::core::System;
pub use crate::engine::{Engine, EngineBuilder, EngineHandle};

// Event bus
pub use crate::core::event_bus::{
    EventBus, EventKey, EventValue, GameplayEvent, ListenerId, DEFAULT_EVENT_VALUE,
};

// Spawner
pub use crate::core::spawner::{
    CameraHandle, EnemySpawner, EntityConfigurator, EntityPool, PoolError, SpawnerError,
    TickOutcome,
};

// Configuration
pub use crate::core::config::{ConfigError, EngineConfig, GameConfig, SpawnerConfig};

// Trigger routing
pub use crate::core::trigger_bridge::{EngineError, TickControl, TriggerSender};
