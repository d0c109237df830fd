use serde::{Deserialize, Serialize};

/// Why a particle stopped advecting. Not a new behavior — the driver's
/// `active`/`beached` booleans remain exactly as spec'd; this just makes the
/// three-way accounting of spec §9 ("deactivation threshold asymmetry")
/// directly queryable instead of re-derived at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeactivationReason {
    StillActive,
    Beached,
    MassDepleted,
}

/// One tagged oil parcel. Spec §3.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub lat: f64,
    pub lon: f64,
    pub mass: f64,
    pub age: f64,
    pub thickness: f64,
    pub evaporated: f64,
    pub dispersed: f64,
    pub emulsion_water: f64,
    pub viscosity: f64,
    pub active: bool,
    pub beached: bool,
}

impl Particle {
    pub fn new_active(lat: f64, lon: f64, mass: f64, viscosity: f64) -> Self {
        Self {
            lat,
            lon,
            mass,
            age: 0.0,
            thickness: 0.0,
            evaporated: 0.0,
            dispersed: 0.0,
            emulsion_water: 0.0,
            viscosity,
            active: true,
            beached: false,
        }
    }

    /// Colocated-and-inactive, for particles not yet released in continuous
    /// mode (spec §4.D).
    pub fn new_unreleased(lat: f64, lon: f64, mass: f64, viscosity: f64) -> Self {
        Self {
            active: false,
            ..Self::new_active(lat, lon, mass, viscosity)
        }
    }

    /// Only meaningful for particles that have been released: unreleased
    /// particles in continuous mode are also `!active && !beached` but are
    /// excluded from the §8.1 accounting by index (release order), not by
    /// this classification.
    pub fn deactivation_reason(&self) -> DeactivationReason {
        if self.beached {
            DeactivationReason::Beached
        } else if !self.active {
            DeactivationReason::MassDepleted
        } else {
            DeactivationReason::StillActive
        }
    }
}
