//! In-process registry of running simulations. Spec §9 "host-agnostic
//! core": the engine never schedules itself, so this is where the
//! Tokio interval loop that actually drives `SimulationDriver::run_until`
//! lives.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use oilspill_core::{DriverState, GridSet, SimulationConfig, SimulationDriver, Statistics};
use oilspill_observability::metrics::SimulationMetrics;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// Cadence at which the driver task advances the simulation and publishes a
/// tick. Each tick runs `config.playback_speed` integration steps.
const TICK_INTERVAL: Duration = Duration::from_millis(50);
const BROADCAST_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Serialize)]
pub struct TickUpdate {
    pub simulation_id: Uuid,
    pub state: String,
    pub time_seconds: f64,
    pub stats: Statistics,
    pub particle_count: usize,
}

pub struct SimulationHandle {
    pub id: Uuid,
    pub driver: Arc<Mutex<SimulationDriver>>,
    pub tx: broadcast::Sender<TickUpdate>,
}

impl SimulationHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<TickUpdate> {
        self.tx.subscribe()
    }
}

#[derive(Clone)]
pub struct SimulationRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Arc<SimulationHandle>>>>,
    max_concurrent_runs: usize,
    metrics: SimulationMetrics,
}

impl SimulationRegistry {
    pub fn new(max_concurrent_runs: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_concurrent_runs,
            metrics: SimulationMetrics::new(),
        }
    }

    /// Builds and registers a new simulation, but does not start it —
    /// callers POST to `/start` separately (spec §4.G state machine).
    pub async fn create(&self, config: SimulationConfig, grids: GridSet) -> Result<Uuid, crate::ApiError> {
        config.validate().map_err(crate::ApiError::Config)?;

        let mut guard = self.inner.write().await;
        if guard.len() >= self.max_concurrent_runs {
            return Err(crate::ApiError::AtCapacity(self.max_concurrent_runs));
        }

        let id = Uuid::new_v4();
        let driver = Arc::new(Mutex::new(SimulationDriver::new(config, grids)));
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        let handle = Arc::new(SimulationHandle { id, driver, tx });
        guard.insert(id, handle.clone());
        drop(guard);

        self.spawn_driver_task(handle);
        info!(simulation_id = %id, "registered simulation");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<SimulationHandle>> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn start(&self, id: Uuid) -> Result<(), crate::ApiError> {
        let handle = self.get(id).await.ok_or(crate::ApiError::NotFound(id))?;
        handle.driver.lock().await.start().map_err(crate::ApiError::Config)?;
        Ok(())
    }

    pub async fn pause(&self, id: Uuid) -> Result<(), crate::ApiError> {
        let handle = self.get(id).await.ok_or(crate::ApiError::NotFound(id))?;
        handle.driver.lock().await.pause();
        Ok(())
    }

    pub async fn reset(&self, id: Uuid) -> Result<(), crate::ApiError> {
        let handle = self.get(id).await.ok_or(crate::ApiError::NotFound(id))?;
        handle.driver.lock().await.reset();
        Ok(())
    }

    /// Drives one simulation forward at `TICK_INTERVAL` cadence until it
    /// completes. Runs until the registry is dropped; each tick is a single
    /// `run_until` batch plus a broadcast publish.
    fn spawn_driver_task(&self, handle: Arc<SimulationHandle>) {
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;

                let (state, time_seconds, stats, particle_count, completed) = {
                    let mut driver = handle.driver.lock().await;
                    let playback_speed = driver.config().playback_speed;
                    let outcome = driver.run_until(playback_speed);
                    (
                        driver.state(),
                        driver.time(),
                        driver.stats().clone(),
                        driver.particles().len(),
                        outcome == oilspill_core::TickOutcome::Completed,
                    )
                };

                metrics.record_particles_beached(&handle.id.to_string(), stats.beached);

                let update = TickUpdate {
                    simulation_id: handle.id,
                    state: format!("{state:?}"),
                    time_seconds,
                    stats,
                    particle_count,
                };
                if handle.tx.send(update).is_err() {
                    // No subscribers currently listening; keep driving so a
                    // client that connects late still sees fresh state.
                }

                if completed {
                    metrics.record_simulation_completed();
                    break;
                }
                if state == DriverState::Idle {
                    // Never started; avoid spinning a no-op loop forever.
                    warn!(simulation_id = %handle.id, "driver task idling, awaiting start");
                }
            }
        });
    }
}
