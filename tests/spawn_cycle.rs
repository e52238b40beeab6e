use std::sync::{Arc, Mutex};

use glam::{Quat, Vec3};
use quackmageddon::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

//--- Shared test pool ----------------------------------------------------

#[derive(Clone, Default)]
struct SharedPool {
    spawns: Arc<Mutex<Vec<Vec3>>>,
}

impl EntityPool for SharedPool {
    type Handle = usize;

    fn spawn(&mut self, _tag: &str, position: Vec3, _orientation: Quat) -> Result<usize, PoolError> {
        let mut spawns = self.spawns.lock().unwrap();
        spawns.push(position);
        Ok(spawns.len() - 1)
    }
}

#[derive(Clone, Default)]
struct SharedConfigurator {
    velocities: Arc<Mutex<Vec<Vec3>>>,
}

impl EntityConfigurator<usize> for SharedConfigurator {
    fn set_velocity(&mut self, _entity: &usize, velocity: Vec3) {
        self.velocities.lock().unwrap().push(velocity);
    }

    fn set_look_at(&mut self, _entity: &usize, _camera: CameraHandle) {}
}

fn one_second_spawner() -> SpawnerConfig {
    SpawnerConfig {
        interval_seconds: 1.0,
        ..SpawnerConfig::default()
    }
}

//--- Scenarios -----------------------------------------------------------

#[test]
fn pause_and_resume_through_trigger_queue() {
    init_logging();

    let engine = EngineBuilder::<GameplayEvent>::new().build();
    let pool = SharedPool::default();
    let configurator = SharedConfigurator::default();

    let mut spawner = EnemySpawner::new(
        one_second_spawner(),
        engine.event_bus(),
        pool.clone(),
        configurator.clone(),
        CameraHandle(3),
    )
    .unwrap()
    .with_seed(42);
    spawner.start(0.0).unwrap();

    let triggers = engine.trigger_sender();
    let bus = engine.event_bus();
    let mut engine = engine.add_system(spawner);

    // First step fires the zero-delay tick
    engine.step(0.5);
    assert_eq!(pool.spawns.lock().unwrap().len(), 1);

    triggers.dispatch_default(GameplayEvent::PauseSpawning).unwrap();
    for _ in 0..3 {
        engine.step(1.0);
    }
    assert_eq!(pool.spawns.lock().unwrap().len(), 1);

    triggers.dispatch_default(GameplayEvent::ResumeSpawning).unwrap();
    engine.step(1.0);
    assert_eq!(pool.spawns.lock().unwrap().len(), 2);
    assert_eq!(configurator.velocities.lock().unwrap().len(), 2);

    triggers.shutdown().unwrap();
    assert_eq!(engine.step(1.0), TickControl::Exit);
    assert!(!bus.has_listeners(&GameplayEvent::PauseSpawning));
    assert!(!bus.has_listeners(&GameplayEvent::ResumeSpawning));
}

#[test]
fn hit_scenario_reaches_every_listener_in_order() {
    init_logging();

    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let a = {
        let log = Arc::clone(&log);
        bus.register(GameplayEvent::EnemyHit, move |v| log.lock().unwrap().push(("a", v)))
    };
    {
        let log = Arc::clone(&log);
        bus.register(GameplayEvent::EnemyHit, move |v| log.lock().unwrap().push(("b", v)));
    }

    assert_eq!(bus.dispatch(&GameplayEvent::EnemyHit, 5), 2);
    assert!(bus.unregister(&GameplayEvent::EnemyHit, a));
    assert_eq!(bus.dispatch(&GameplayEvent::EnemyHit, 7), 1);

    assert_eq!(*log.lock().unwrap(), vec![("a", 5), ("b", 5), ("b", 7)]);
}

#[test]
fn threaded_engine_spawns_and_shuts_down() {
    init_logging();

    let engine = EngineBuilder::<GameplayEvent>::new()
        .with_tps(200.0)
        .build();
    let pool = SharedPool::default();

    let mut spawner = EnemySpawner::new(
        SpawnerConfig {
            interval_seconds: 0.01,
            ..SpawnerConfig::default()
        },
        engine.event_bus(),
        pool.clone(),
        SharedConfigurator::default(),
        CameraHandle(1),
    )
    .unwrap();
    spawner.start_default().unwrap();

    let bus = engine.event_bus();
    let handle = engine.add_system(spawner).spawn();

    std::thread::sleep(std::time::Duration::from_millis(100));
    handle.shutdown().unwrap();

    assert!(!pool.spawns.lock().unwrap().is_empty());
    assert!(!bus.has_listeners(&GameplayEvent::PauseSpawning));
}

#[test]
fn config_file_drives_engine_and_spawner() {
    init_logging();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quack.ini");

    let mut written = GameConfig::with_path(&path);
    written.engine.tps = 30.0;
    written.spawner.spawn_radius = 4.0;
    written.spawner.entity_tag = "Duck".to_string();
    written.save_to_file().unwrap();

    let mut loaded = GameConfig::with_path(&path);
    loaded.load_from_file().unwrap();
    assert_eq!(loaded.engine.tps, 30.0);
    assert_eq!(loaded.spawner.spawn_radius, 4.0);
    assert_eq!(loaded.spawner.entity_tag, "Duck");

    let engine = EngineBuilder::<GameplayEvent>::from_config(&loaded.engine).build();
    assert_eq!(engine.tps(), 30.0);

    let mut spawner = EnemySpawner::new(
        loaded.spawner.clone(),
        engine.event_bus(),
        SharedPool::default(),
        SharedConfigurator::default(),
        CameraHandle(0),
    )
    .unwrap();

    let TickOutcome::Spawned(plan) = spawner.tick() else {
        panic!("expected a spawn");
    };
    let horizontal = Vec3::new(plan.position.x, 0.0, plan.position.z).length();
    assert!((horizontal - 4.0).abs() < 1e-4);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GameConfig::with_path(dir.path().join("absent.ini"));

    assert!(matches!(config.load_from_file(), Err(ConfigError::Io(_))));
    assert_eq!(config.spawner, SpawnerConfig::default());
}

#[test]
fn shutdown_with_full_trigger_queue_unregisters_spawner() {
    init_logging();

    let engine = EngineBuilder::<GameplayEvent>::new()
        .with_tps(20.0)
        .with_channel_capacity(1)
        .build();
    let bus = engine.event_bus();

    let spawner = EnemySpawner::new(
        SpawnerConfig::default(),
        engine.event_bus(),
        SharedPool::default(),
        SharedConfigurator::default(),
        CameraHandle(1),
    )
    .unwrap();

    let handle = engine.add_system(spawner).spawn();
    while handle.triggers().dispatch(GameplayEvent::EnemyHit, 1).is_ok() {}

    assert_eq!(handle.shutdown(), Ok(()));
    assert!(!bus.has_listeners(&GameplayEvent::PauseSpawning));
    assert!(!bus.has_listeners(&GameplayEvent::ResumeSpawning));
}

struct FailingPool;

impl EntityPool for FailingPool {
    type Handle = usize;

    fn spawn(&mut self, _tag: &str, _position: Vec3, _orientation: Quat) -> Result<usize, PoolError> {
        panic!("pool blew up");
    }
}

#[test]
fn panicking_pool_does_not_stop_the_loop() {
    init_logging();

    let engine = EngineBuilder::<GameplayEvent>::new()
        .with_tps(200.0)
        .build();
    let hits = Arc::new(Mutex::new(Vec::new()));
    {
        let hits = Arc::clone(&hits);
        engine
            .event_bus()
            .register(GameplayEvent::EnemyHit, move |v| hits.lock().unwrap().push(v));
    }

    let mut spawner = EnemySpawner::new(
        SpawnerConfig {
            interval_seconds: 0.01,
            ..SpawnerConfig::default()
        },
        engine.event_bus(),
        FailingPool,
        SharedConfigurator::default(),
        CameraHandle(1),
    )
    .unwrap();
    spawner.start_default().unwrap();

    let handle = engine.add_system(spawner).spawn();
    std::thread::sleep(std::time::Duration::from_millis(50));

    assert!(!handle.is_finished());
    handle.triggers().dispatch(GameplayEvent::EnemyHit, 9).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(50));

    assert_eq!(handle.shutdown(), Ok(()));
    assert_eq!(*hits.lock().unwrap(), vec![9]);
}
