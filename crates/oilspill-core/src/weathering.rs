//! Pure, global-over-all-parcels weathering curves. Spec §4.C.

use crate::oil_properties::OilProperties;

/// Evaporation fraction `F_e(h)`. Zero for `h <= 0`.
pub fn evaporation_fraction(elapsed_hours: f64, water_temp_c: f64, wind_speed_ms: f64, oil: &OilProperties) -> f64 {
    if elapsed_hours <= 0.0 {
        return 0.0;
    }
    let k = oil.evap_rate * (1.0 + 0.045 * (water_temp_c - 15.0));
    let f_e = k * elapsed_hours.sqrt() * (1.0 + 0.01 * wind_speed_ms);
    f_e.min(oil.volatile_frac)
}

/// Natural dispersion fraction `F_d(h)`. Zero for `h <= 0` or `W < 5`.
pub fn dispersion_fraction(elapsed_hours: f64, wind_speed_ms: f64, oil: &OilProperties) -> f64 {
    if elapsed_hours <= 0.0 || wind_speed_ms < 5.0 {
        return 0.0;
    }
    let f_d = 0.0034 * oil.dispersibility * (wind_speed_ms * wind_speed_ms * 0.001) * elapsed_hours;
    f_d.min(0.3)
}

/// Emulsion water fraction `Y(h)`. Zero for `h <= 0` or `W < 3`.
pub fn emulsion_water_fraction(elapsed_hours: f64, wind_speed_ms: f64) -> f64 {
    if elapsed_hours <= 0.0 || wind_speed_ms < 3.0 {
        return 0.0;
    }
    let k_a = 2e-6 * (wind_speed_ms + 1.0).powi(2);
    let y = 0.7 * (1.0 - (-k_a * elapsed_hours * 3600.0).exp());
    y.min(0.7)
}

/// Viscosity multiplier `μ(F_e, Y)`.
pub fn viscosity_multiplier(evaporated: f64, emulsion_water: f64) -> f64 {
    (5.0 * evaporated).exp() * (1.0 - emulsion_water).powf(-2.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OilKind;

    // Spec §8.4 S1 — evaporation sanity.
    #[test]
    fn evaporation_sanity_s1() {
        let crude = OilProperties::for_kind(OilKind::Crude);
        let f_e = evaporation_fraction(48.0, 15.0, 5.0, crude);
        assert!((f_e - 0.25).abs() < 1e-9);
    }

    // Spec §8.4 S2 — emulsion curve, effectively saturates at 0.7.
    #[test]
    fn emulsion_curve_s2() {
        let y = emulsion_water_fraction(24.0, 10.0);
        assert!((y - 0.7).abs() < 1e-3);
    }

    // Spec §8.4 S3 — viscosity multiplier.
    #[test]
    fn viscosity_multiplier_s3() {
        let mu = viscosity_multiplier(0.25, 0.7);
        assert!((mu - 70.8).abs() < 0.1, "mu = {mu}");
        let crude = OilProperties::for_kind(OilKind::Crude);
        let viscosity = crude.viscosity_mpa_s * mu;
        assert!((viscosity - 850.0).abs() < 5.0, "viscosity = {viscosity}");
    }

    #[test]
    fn zero_elapsed_hours_yields_zero() {
        let crude = OilProperties::for_kind(OilKind::Crude);
        assert_eq!(evaporation_fraction(0.0, 15.0, 5.0, crude), 0.0);
        assert_eq!(dispersion_fraction(0.0, 10.0, crude), 0.0);
        assert_eq!(emulsion_water_fraction(0.0, 10.0), 0.0);
    }

    #[test]
    fn low_wind_suppresses_dispersion_and_emulsion() {
        let crude = OilProperties::for_kind(OilKind::Crude);
        assert_eq!(dispersion_fraction(10.0, 4.9, crude), 0.0);
        assert_eq!(emulsion_water_fraction(10.0, 2.9), 0.0);
    }

    #[test]
    fn dispersion_caps_at_point_three() {
        let crude = OilProperties::for_kind(OilKind::Crude);
        let f_d = dispersion_fraction(1_000.0, 30.0, crude);
        assert_eq!(f_d, 0.3);
    }
}
