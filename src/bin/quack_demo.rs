//=========================================================================
// Quackmageddon Demo
//
// Runs the engine on a background thread with one enemy spawner, then
// pauses and resumes spawning from the main thread.
//
// Usage:
//   quack-demo --seconds 12 --seed 7
//   quack-demo --config ./quackmageddon.ini
//
//=========================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use glam::{Quat, Vec3};
use log::{error, info};

use quackmageddon::prelude::*;

/// Quackmageddon spawner demo
#[derive(Parser)]
#[command(version, about = "Spawns ducks on a timer and toggles spawning via events")]
struct Cli {
    /// INI file with [engine] and [spawner] sections.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How long to run, in seconds.
    #[arg(long, default_value_t = 9.0)]
    seconds: f32,

    /// Seed for reproducible spawn positions.
    #[arg(long)]
    seed: Option<u64>,

    /// Pool capacity; further spawns are refused.
    #[arg(long, value_name = "COUNT")]
    max_enemies: Option<u64>,
}

//=== In-memory collaborators =============================================

struct LoggingPool {
    spawned: Arc<AtomicU64>,
    capacity: Option<u64>,
}

impl EntityPool for LoggingPool {
    type Handle = u64;

    fn spawn(&mut self, tag: &str, position: Vec3, orientation: Quat) -> Result<u64, PoolError> {
        let next = self.spawned.load(Ordering::SeqCst);
        if self.capacity.is_some_and(|cap| next >= cap) {
            return Err(PoolError::Exhausted {
                tag: tag.to_string(),
            });
        }
        self.spawned.fetch_add(1, Ordering::SeqCst);

        info!(
            "{} #{} at ({:.2}, {:.2}, {:.2}) facing {:?}",
            tag,
            next,
            position.x,
            position.y,
            position.z,
            orientation * Vec3::Z
        );
        Ok(next)
    }
}

struct LoggingConfigurator;

impl EntityConfigurator<u64> for LoggingConfigurator {
    fn set_velocity(&mut self, entity: &u64, velocity: Vec3) {
        info!("  #{} velocity {:.2} m/s", entity, velocity.length());
    }

    fn set_look_at(&mut self, entity: &u64, camera: CameraHandle) {
        info!("  #{} looks at camera {}", entity, camera.0);
    }
}

//=== Main ================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = GameConfig::with_path(path);
            config.load_from_file()?;
            config
        }
        None => GameConfig::new(),
    };

    let engine = EngineBuilder::<GameplayEvent>::from_config(&config.engine).build();
    let bus = engine.event_bus();

    bus.register(GameplayEvent::EnemyHit, |points| {
        info!("Enemy hit for {} points", points)
    });
    bus.register(GameplayEvent::PauseSpawning, |_| info!("Spawning paused"));
    bus.register(GameplayEvent::ResumeSpawning, |_| info!("Spawning resumed"));

    let spawned = Arc::new(AtomicU64::new(0));
    let pool = LoggingPool {
        spawned: Arc::clone(&spawned),
        capacity: cli.max_enemies,
    };

    let mut spawner = EnemySpawner::new(
        config.spawner.clone(),
        bus,
        pool,
        LoggingConfigurator,
        CameraHandle(1),
    )?;
    if let Some(seed) = cli.seed {
        spawner = spawner.with_seed(seed);
    }
    spawner.start_default()?;

    let handle = engine.add_system(spawner).spawn();
    let phase = Duration::from_secs_f32(cli.seconds.max(0.0) / 3.0);

    thread::sleep(phase);
    handle.triggers().dispatch_default(GameplayEvent::PauseSpawning)?;

    thread::sleep(phase);
    handle.triggers().dispatch_default(GameplayEvent::ResumeSpawning)?;
    handle.triggers().dispatch(GameplayEvent::EnemyHit, 5)?;

    thread::sleep(phase);
    handle.shutdown()?;

    info!("Demo finished: {} enemies spawned", spawned.load(Ordering::SeqCst));
    Ok(())
}
