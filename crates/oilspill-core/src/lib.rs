pub mod config;
pub mod driver;
pub mod error;
pub mod grid;
pub mod integrator;
pub mod oil_properties;
pub mod particle;
pub mod statistics;
pub mod weathering;

pub use config::{AppConfig, ApiConfig, ObservabilityConfig, OilKind, SimulationConfig, SpillMode};
pub use driver::{DriverState, SimulationDriver, TickOutcome};
pub use error::{ConfigError, GridError};
pub use grid::{FieldGrid, GridDocument, GridSet};
pub use oil_properties::OilProperties;
pub use particle::{DeactivationReason, Particle};
pub use statistics::Statistics;
