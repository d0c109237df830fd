//! Aggregates active particles into area, centroid, weathering percentages,
//! beached count. Spec §4.F.

use serde::{Deserialize, Serialize};

use crate::particle::Particle;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const KM_PER_DEGREE: f64 = 111.32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub centroid_lat: f64,
    pub centroid_lon: f64,
    pub area_km2: f64,
    pub max_drift_km: f64,
    pub beached: usize,
    pub evaporated_pct: f64,
    pub dispersed_pct: f64,
    pub emulsion_water_pct: f64,
    pub remaining_pct: f64,
    pub viscosity_mpa_s: f64,
}

impl Statistics {
    /// Initial snapshot before any step has run (spec §4.G `initialize`).
    pub fn initial(spill_lat: f64, spill_lon: f64) -> Self {
        Self {
            centroid_lat: spill_lat,
            centroid_lon: spill_lon,
            area_km2: 0.0,
            max_drift_km: 0.0,
            beached: 0,
            evaporated_pct: 0.0,
            dispersed_pct: 0.0,
            emulsion_water_pct: 0.0,
            remaining_pct: 100.0,
            viscosity_mpa_s: 0.0,
        }
    }

    /// Rescans `particles` after a completed step. If there are no active
    /// particles, only `beached` is refreshed — centroid/area/max_drift
    /// retain their previous values (spec §4.F).
    pub fn update(&mut self, particles: &[Particle], spill_lat: f64, spill_lon: f64) {
        self.beached = particles.iter().filter(|p| p.beached).count();

        let active: Vec<&Particle> = particles.iter().filter(|p| p.active).collect();
        if active.is_empty() {
            return;
        }

        let n = active.len() as f64;
        let centroid_lat = active.iter().map(|p| p.lat).sum::<f64>() / n;
        let centroid_lon = active.iter().map(|p| p.lon).sum::<f64>() / n;

        let var_lat = active.iter().map(|p| (p.lat - centroid_lat).powi(2)).sum::<f64>() / n;
        let var_lon = active.iter().map(|p| (p.lon - centroid_lon).powi(2)).sum::<f64>() / n;
        let sigma_lat_km = var_lat.sqrt() * KM_PER_DEGREE;
        let sigma_lon_km = var_lon.sqrt() * KM_PER_DEGREE * (centroid_lat.to_radians()).cos();

        let max_drift_km = active
            .iter()
            .map(|p| haversine_m(spill_lat, spill_lon, p.lat, p.lon) / 1000.0)
            .fold(0.0_f64, f64::max);

        let representative = active[0];

        self.centroid_lat = centroid_lat;
        self.centroid_lon = centroid_lon;
        self.area_km2 = std::f64::consts::PI * (2.0 * sigma_lat_km) * (2.0 * sigma_lon_km);
        self.max_drift_km = max_drift_km;
        self.evaporated_pct = representative.evaporated * 100.0;
        self.dispersed_pct = representative.dispersed * 100.0;
        self.emulsion_water_pct = representative.emulsion_water * 100.0;
        self.remaining_pct = (1.0 - representative.evaporated - representative.dispersed) * 100.0;
        self.viscosity_mpa_s = representative.viscosity;
    }
}

fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}
