//=========================================================================
// Game Configuration
//=========================================================================
//
// Engine and spawner settings loaded from an INI file.
//
// File format:
// ```ini
// [engine]
// tps = 60
// channel_capacity = 128
//
// [spawner]
// interval = 3
// initial_delay = 0
// radius = 10
// altitude = 5
// min_power = 5
// max_power = 10
// target_x = 0
// target_y = 0
// target_z = 0
// tag = Enemy
// ```
//
// Missing keys keep their defaults; every loaded value is validated.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use configparser::ini::Ini;
use glam::Vec3;
use log::info;

//=== Defaults ============================================================

const DEFAULT_TPS: f64 = 60.0;
const DEFAULT_CHANNEL_CAPACITY: usize = 128;

const DEFAULT_INTERVAL_SECONDS: f32 = 3.0;
const DEFAULT_INITIAL_DELAY_SECONDS: f32 = 0.0;
const DEFAULT_SPAWN_RADIUS: f32 = 10.0;
const DEFAULT_SPAWN_ALTITUDE: f32 = 5.0;
const DEFAULT_MIN_POWER: f32 = 5.0;
const DEFAULT_MAX_POWER: f32 = 10.0;
const DEFAULT_ENTITY_TAG: &str = "Enemy";

const DEFAULT_CONFIG_PATH: &str = "./quackmageddon.ini";

//=== ConfigError =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file could not be read, parsed or written.
    Io(String),

    /// A value is present but unusable.
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Config file error: {}", e),
            Self::Invalid { field, reason } => write!(f, "Invalid {}: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

//=== EngineConfig ========================================================

/// Host loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Logic ticks per second.
    pub tps: f64,
    /// Capacity of the cross-thread trigger channel.
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tps: DEFAULT_TPS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tps.is_finite() && self.tps > 0.0) {
            return Err(invalid("engine.tps", format!("must be positive, got {}", self.tps)));
        }
        if self.channel_capacity == 0 {
            return Err(invalid("engine.channel_capacity", "must be positive"));
        }
        Ok(())
    }

    fn apply_ini(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        if let Some(tps) = read_float(ini, "engine.tps")? {
            self.tps = tps;
        }
        if let Some(capacity) = ini
            .getuint("engine", "channel_capacity")
            .map_err(|e| invalid("engine.channel_capacity", e))?
        {
            self.channel_capacity = capacity as usize;
        }
        Ok(())
    }

    fn write_ini(&self, ini: &mut Ini) {
        ini.set("engine", "tps", Some(self.tps.to_string()));
        ini.set("engine", "channel_capacity", Some(self.channel_capacity.to_string()));
    }
}

//=== SpawnerConfig =======================================================

/// Immutable spawner settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnerConfig {
    /// Seconds between spawns once started.
    pub interval_seconds: f32,
    /// Delay before the first spawn when started with the default delay.
    pub initial_delay_seconds: f32,
    /// Radius of the horizontal spawn circle.
    pub spawn_radius: f32,
    /// Height of the spawn circle.
    pub spawn_altitude: f32,
    /// Lower bound of the throw speed.
    pub min_power: f32,
    /// Upper bound of the throw speed.
    pub max_power: f32,
    /// Point every spawned enemy is thrown toward.
    pub facing_target: Vec3,
    /// Pool tag requested for each spawn.
    pub entity_tag: String,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            initial_delay_seconds: DEFAULT_INITIAL_DELAY_SECONDS,
            spawn_radius: DEFAULT_SPAWN_RADIUS,
            spawn_altitude: DEFAULT_SPAWN_ALTITUDE,
            min_power: DEFAULT_MIN_POWER,
            max_power: DEFAULT_MAX_POWER,
            facing_target: Vec3::ZERO,
            entity_tag: DEFAULT_ENTITY_TAG.to_string(),
        }
    }
}

impl SpawnerConfig {
    /// Checks every field; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("spawner.interval", self.interval_seconds),
            ("spawner.initial_delay", self.initial_delay_seconds),
            ("spawner.radius", self.spawn_radius),
            ("spawner.altitude", self.spawn_altitude),
            ("spawner.min_power", self.min_power),
            ("spawner.max_power", self.max_power),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {}", value)));
            }
        }
        if !self.facing_target.is_finite() {
            return Err(invalid("spawner.target", "must be finite"));
        }

        if self.interval_seconds <= 0.0 {
            return Err(invalid(
                "spawner.interval",
                format!("must be positive, got {}", self.interval_seconds),
            ));
        }
        if self.initial_delay_seconds < 0.0 {
            return Err(invalid("spawner.initial_delay", "must not be negative"));
        }
        if self.spawn_radius < 0.0 {
            return Err(invalid("spawner.radius", "must not be negative"));
        }
        if self.min_power < 0.0 {
            return Err(invalid("spawner.min_power", "must not be negative"));
        }
        if self.min_power > self.max_power {
            return Err(invalid(
                "spawner.max_power",
                format!("{} is below min_power {}", self.max_power, self.min_power),
            ));
        }
        if self.entity_tag.trim().is_empty() {
            return Err(invalid("spawner.tag", "must not be empty"));
        }
        Ok(())
    }

    fn apply_ini(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        if let Some(v) = read_float(ini, "spawner.interval")? {
            self.interval_seconds = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.initial_delay")? {
            self.initial_delay_seconds = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.radius")? {
            self.spawn_radius = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.altitude")? {
            self.spawn_altitude = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.min_power")? {
            self.min_power = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.max_power")? {
            self.max_power = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.target_x")? {
            self.facing_target.x = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.target_y")? {
            self.facing_target.y = v as f32;
        }
        if let Some(v) = read_float(ini, "spawner.target_z")? {
            self.facing_target.z = v as f32;
        }
        if let Some(tag) = ini.get("spawner", "tag") {
            self.entity_tag = tag;
        }
        Ok(())
    }

    fn write_ini(&self, ini: &mut Ini) {
        let section = "spawner";
        ini.set(section, "interval", Some(self.interval_seconds.to_string()));
        ini.set(section, "initial_delay", Some(self.initial_delay_seconds.to_string()));
        ini.set(section, "radius", Some(self.spawn_radius.to_string()));
        ini.set(section, "altitude", Some(self.spawn_altitude.to_string()));
        ini.set(section, "min_power", Some(self.min_power.to_string()));
        ini.set(section, "max_power", Some(self.max_power.to_string()));
        ini.set(section, "target_x", Some(self.facing_target.x.to_string()));
        ini.set(section, "target_y", Some(self.facing_target.y.to_string()));
        ini.set(section, "target_z", Some(self.facing_target.z.to_string()));
        ini.set(section, "tag", Some(self.entity_tag.clone()));
    }
}

//=== GameConfig ==========================================================

/// Complete configuration file contents plus its location.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub engine: EngineConfig,
    pub spawner: SpawnerConfig,
    /// Path used by `load_from_file` and `save_to_file`.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Creates a configuration with safe default values.
    pub fn new() -> Self {
        Self {
            engine: EngineConfig::default(),
            spawner: SpawnerConfig::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Creates a default configuration bound to a custom file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Loads values from `config_path`, keeping defaults for missing keys.
    ///
    /// On error the configuration is left unchanged.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.load(&self.config_path)
            .map_err(|e| ConfigError::Io(format!("Failed to load config file: {}", e)))?;

        self.apply(&ini)?;

        info!(
            "Loaded config from {:?}: tps={}, interval={}s, radius={}, altitude={}, power={}..{}",
            self.config_path,
            self.engine.tps,
            self.spawner.interval_seconds,
            self.spawner.spawn_radius,
            self.spawner.spawn_altitude,
            self.spawner.min_power,
            self.spawner.max_power
        );
        Ok(())
    }

    /// Parses INI text instead of a file.
    pub fn load_from_str(&mut self, contents: &str) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.read(contents.to_string())
            .map_err(|e| ConfigError::Io(format!("Failed to parse config: {}", e)))?;
        self.apply(&ini)
    }

    /// Writes the configuration to `config_path`, creating the file if needed.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        self.engine.write_ini(&mut ini);
        self.spawner.write_ini(&mut ini);

        ini.write(&self.config_path)
            .map_err(|e| ConfigError::Io(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    fn apply(&mut self, ini: &Ini) -> Result<(), ConfigError> {
        let mut engine = self.engine.clone();
        let mut spawner = self.spawner.clone();

        engine.apply_ini(ini)?;
        spawner.apply_ini(ini)?;
        engine.validate()?;
        spawner.validate()?;

        self.engine = engine;
        self.spawner = spawner;
        Ok(())
    }
}

//=== Helpers =============================================================

/// Reads `field`, given as `section.key`, as a float.
fn read_float(ini: &Ini, field: &'static str) -> Result<Option<f64>, ConfigError> {
    let (section, key) = field.split_once('.').unwrap_or(("default", field));
    ini.getfloat(section, key).map_err(|e| invalid(field, e))
}

//=========================================================================
// Unit Tests
//=========================================================================
