//=========================================================================
// Quackmageddon — Library Root
//
// This crate defines the public API surface of the Quackmageddon
// gameplay runtime.
//
// Responsibilities:
// - Expose the host loop (`Engine`, `EngineBuilder`, `EngineHandle`)
// - Expose the gameplay building blocks under `core` (event bus,
//   enemy spawner, timer, configuration)
//
// Typical usage:
// ```no_run
// use quackmageddon::prelude::*;
//
// let engine = EngineBuilder::<GameplayEvent>::new().build();
// let bus = engine.event_bus();
// bus.register(GameplayEvent::EnemyHit, |points| log::info!("hit for {}", points));
//
// let handle = engine.spawn();
// handle.triggers().dispatch(GameplayEvent::EnemyHit, 5).ok();
// handle.shutdown().ok();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the gameplay systems (event bus, spawner, timer,
// configuration, trigger routing). Most applications only need the
// prelude.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `engine` defines the host loop entry point and its builder.
//
mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, EngineHandle};
