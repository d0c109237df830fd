use thiserror::Error;

/// Configuration errors surfaced synchronously from `initialize`/`start`.
///
/// None of these can occur mid-run: validation happens once, before the
/// first particle is created.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("particle_count must be positive")]
    ZeroParticles,

    #[error("max_time_seconds must be positive")]
    NonPositiveHorizon,

    #[error("time_step_seconds must be positive")]
    NonPositiveTimeStep,

    #[error("spill_duration_hours must be positive in continuous release mode")]
    ZeroSpillDuration,
}

/// A malformed grid document is rejected at load time; its slot stays
/// `None` and the engine falls back to scalar fields for that variable set.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("axis is not strictly ascending")]
    NonAscendingAxis,

    #[error("variable array length {actual} does not match expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("variable array contains a non-finite value")]
    NonFiniteValue,
}
