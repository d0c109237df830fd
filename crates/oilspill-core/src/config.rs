use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Kinds of oil the static [`OilProperties`](crate::oil_properties::OilProperties)
/// table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OilKind {
    Crude,
    Fuel,
    Diesel,
    Gasoline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpillMode {
    Instant,
    Continuous,
}

/// Everything the engine needs to run one simulation, per spec §6.2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub spill_lat: f64,
    pub spill_lng: f64,
    pub oil_volume_tonnes: f64,
    pub oil_type: OilKind,

    pub spill_mode: SpillMode,
    /// Hours; only consulted when `spill_mode == Continuous`.
    pub spill_duration_hours: f64,

    pub particle_count: usize,
    pub time_step_seconds: f64,
    pub max_time_seconds: f64,

    pub wind_speed_ms: f64,
    pub wind_dir_deg: f64,
    pub current_speed_ms: f64,
    pub current_dir_deg: f64,
    pub water_temp_c: f64,

    pub use_grid_data: bool,
    pub grid_time_offset_hours: f64,

    pub playback_speed: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spill_lat: 0.0,
            spill_lng: 0.0,
            oil_volume_tonnes: 1000.0,
            oil_type: OilKind::Crude,
            spill_mode: SpillMode::Instant,
            spill_duration_hours: 0.0,
            particle_count: 500,
            time_step_seconds: 600.0,
            max_time_seconds: 48.0 * 3600.0,
            wind_speed_ms: 5.0,
            wind_dir_deg: 0.0,
            current_speed_ms: 0.0,
            current_dir_deg: 0.0,
            water_temp_c: 15.0,
            use_grid_data: true,
            grid_time_offset_hours: 0.0,
            playback_speed: 1,
        }
    }
}

impl SimulationConfig {
    /// §7 "Invalid configuration" — checked once before `initialize`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if self.max_time_seconds <= 0.0 {
            return Err(ConfigError::NonPositiveHorizon);
        }
        if self.time_step_seconds <= 0.0 {
            return Err(ConfigError::NonPositiveTimeStep);
        }
        if self.spill_mode == SpillMode::Continuous && self.spill_duration_hours <= 0.0 {
            return Err(ConfigError::ZeroSpillDuration);
        }
        Ok(())
    }
}

/// Host-side bind settings for `oilspill-api`. Not consulted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub port: u16,
    pub max_concurrent_runs: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            max_concurrent_runs: 16,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("OILSPILL_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(port) = std::env::var("OILSPILL_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub json_logs: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
            metrics_port: 9090,
        }
    }
}

/// Struct-of-structs root config for `oilspill-api`, mirroring the teacher's
/// layered `Config` (file → env override). `oilspill-core`'s engine itself
/// only ever sees a `SimulationConfig`, supplied per-run over the wire; this
/// type is the host's process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub default_simulation: SimulationConfig,
}

impl AppConfig {
    /// Load from a YAML file, no environment overrides applied.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults overridden by `OILSPILL_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api = ApiConfig::from_env();
        if let Ok(level) = std::env::var("OILSPILL_LOG_LEVEL") {
            config.observability.log_level = level;
        }
        if let Ok(port) = std::env::var("OILSPILL_METRICS_PORT") {
            if let Ok(p) = port.parse() {
                config.observability.metrics_port = p;
            }
        }
        config
    }

    /// File config with environment overrides layered on top; the shape the
    /// host binary actually calls when `OILSPILL_CONFIG_FILE` is set.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config = Self::from_file(path)?;
        let env = Self::from_env();
        config.api = env.api;
        if std::env::var("OILSPILL_LOG_LEVEL").is_ok() {
            config.observability.log_level = env.observability.log_level;
        }
        if std::env::var("OILSPILL_METRICS_PORT").is_ok() {
            config.observability.metrics_port = env.observability.metrics_port;
        }
        Ok(config)
    }
}
