//! Owns configuration, particles, grids, and time; exposes start/pause/
//! reset; advances a bounded number of steps per tick. Spec §4.G.

use tracing::{debug, info};

use crate::config::{SimulationConfig, SpillMode};
use crate::error::ConfigError;
use crate::grid::GridSet;
use crate::integrator::{Integrator, TrajectorySample};
use crate::oil_properties::OilProperties;
use crate::particle::Particle;
use crate::statistics::Statistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Whether a `run_until` call reached the configured horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continuing,
    Completed,
}

type UpdateCallback = Box<dyn Fn(&[Particle], &Statistics, f64) + Send + Sync>;
type CompleteCallback = Box<dyn Fn() + Send + Sync>;

/// The host-agnostic simulation owner. Exposes `step`/`run_until` as the
/// primitives a host loop (a Tokio interval, a game-engine tick, a test
/// harness) drives at its own cadence; this type never sleeps and never
/// spawns anything itself (spec §9 "host-agnostic core").
pub struct SimulationDriver {
    config: SimulationConfig,
    grids: GridSet,
    integrator: Integrator,

    state: DriverState,
    time: f64,
    particles: Vec<Particle>,
    particles_released: usize,
    trajectory: Vec<TrajectorySample>,
    stats: Statistics,

    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl SimulationDriver {
    pub fn new(config: SimulationConfig, grids: GridSet) -> Self {
        let stats = Statistics::initial(config.spill_lat, config.spill_lng);
        Self {
            config,
            grids,
            integrator: Integrator::new(),
            state: DriverState::Idle,
            time: 0.0,
            particles: Vec::new(),
            particles_released: 0,
            trajectory: Vec::new(),
            stats,
            on_update: None,
            on_complete: None,
        }
    }

    /// Replaces the default (entropy-seeded) integrator RNG with a seeded
    /// one, for reproducible runs (spec §5).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.integrator = Integrator::with_seed(seed);
        self
    }

    pub fn on_update<F>(&mut self, f: F)
    where
        F: Fn(&[Particle], &Statistics, f64) + Send + Sync + 'static,
    {
        self.on_update = Some(Box::new(f));
    }

    pub fn on_complete<F>(&mut self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(f));
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn trajectory(&self) -> &[TrajectorySample] {
        &self.trajectory
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Builds the N particles per the configured release mode, resets time,
    /// trajectory, and stats. Returns a config error before touching any
    /// state (spec §7).
    pub fn initialize(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;

        self.time = 0.0;
        self.trajectory.clear();
        self.particles_released = 0;
        self.stats = Statistics::initial(self.config.spill_lat, self.config.spill_lng);

        let oil = OilProperties::for_kind(self.config.oil_type);
        let n = self.config.particle_count;
        self.particles = Vec::with_capacity(n);

        match self.config.spill_mode {
            SpillMode::Instant => {
                for _ in 0..n {
                    let (lat, lon) = self.integrator.disk_offset(self.config.spill_lat, self.config.spill_lng, 200.0);
                    self.particles.push(Particle::new_active(lat, lon, 0.0, oil.viscosity_mpa_s));
                }
                self.particles_released = n;
            }
            SpillMode::Continuous => {
                for _ in 0..n {
                    self.particles.push(Particle::new_unreleased(
                        self.config.spill_lat,
                        self.config.spill_lng,
                        0.0,
                        oil.viscosity_mpa_s,
                    ));
                }
            }
        }

        self.state = DriverState::Idle;
        info!(particle_count = n, spill_mode = ?self.config.spill_mode, "simulation initialized");
        Ok(())
    }

    /// `idle -> running`. Runs `initialize` first if the driver has never
    /// been started.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.particles.is_empty() {
            self.initialize()?;
        }
        if self.state != DriverState::Completed {
            self.state = DriverState::Running;
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == DriverState::Running {
            self.state = DriverState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == DriverState::Paused {
            self.state = DriverState::Running;
        }
    }

    /// Idempotent and valid from any state (spec §5 "Cancellation").
    pub fn reset(&mut self) {
        debug!(previous_state = ?self.state, "resetting simulation");
        self.state = DriverState::Idle;
        self.time = 0.0;
        self.particles.clear();
        self.particles_released = 0;
        self.trajectory.clear();
        self.stats = Statistics::initial(self.config.spill_lat, self.config.spill_lng);
    }

    /// Advances exactly one integration step.
    pub fn step(&mut self) {
        let oil = OilProperties::for_kind(self.config.oil_type);
        let dt = self.config.time_step_seconds;

        if let Some(sample) = self.integrator.step(
            &self.config,
            oil,
            &self.grids,
            &mut self.particles,
            &mut self.particles_released,
            self.time,
            dt,
        ) {
            self.trajectory.push(sample);
        }
        self.time += dt;
        self.stats.update(&self.particles, self.config.spill_lat, self.config.spill_lng);
    }

    /// Runs up to `budget_steps` steps, or until the configured horizon is
    /// reached, whichever comes first. Fires `on_update` exactly once after
    /// the batch (spec §4.G "Tick cadence") and `on_complete` exactly once
    /// when the horizon is crossed. Never sleeps — the caller owns timing.
    pub fn run_until(&mut self, budget_steps: u32) -> TickOutcome {
        if self.state == DriverState::Completed {
            return TickOutcome::Completed;
        }
        if self.time >= self.config.max_time_seconds {
            self.state = DriverState::Completed;
            info!(time = self.time, "simulation horizon reached");
            if let Some(cb) = &self.on_complete {
                cb();
            }
            return TickOutcome::Completed;
        }
        if self.state != DriverState::Running {
            return TickOutcome::Continuing;
        }

        for _ in 0..budget_steps.max(1) {
            if self.time >= self.config.max_time_seconds {
                break;
            }
            self.step();
        }

        if let Some(cb) = &self.on_update {
            cb(&self.particles, &self.stats, self.time);
        }

        if self.time >= self.config.max_time_seconds {
            self.state = DriverState::Completed;
            if let Some(cb) = &self.on_complete {
                cb();
            }
            TickOutcome::Completed
        } else {
            TickOutcome::Continuing
        }
    }
}
