use crate::config::OilKind;

/// Static catalog entry for one oil kind. Spec §4.B — values are exact, no
/// rounding latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OilProperties {
    pub density_kg_m3: f64,
    pub viscosity_mpa_s: f64,
    pub api_gravity: f64,
    pub evap_rate: f64,
    pub pour_point_c: f64,
    pub volatile_frac: f64,
    pub dispersibility: f64,
}

const CRUDE: OilProperties = OilProperties {
    density_kg_m3: 860.0,
    viscosity_mpa_s: 12.0,
    api_gravity: 33.0,
    evap_rate: 0.042,
    pour_point_c: -15.0,
    volatile_frac: 0.25,
    dispersibility: 0.5,
};

const FUEL: OilProperties = OilProperties {
    density_kg_m3: 950.0,
    viscosity_mpa_s: 180.0,
    api_gravity: 17.0,
    evap_rate: 0.015,
    pour_point_c: 10.0,
    volatile_frac: 0.08,
    dispersibility: 0.2,
};

const DIESEL: OilProperties = OilProperties {
    density_kg_m3: 840.0,
    viscosity_mpa_s: 4.0,
    api_gravity: 37.0,
    evap_rate: 0.065,
    pour_point_c: -30.0,
    volatile_frac: 0.45,
    dispersibility: 0.7,
};

const GASOLINE: OilProperties = OilProperties {
    density_kg_m3: 740.0,
    viscosity_mpa_s: 0.6,
    api_gravity: 60.0,
    evap_rate: 0.12,
    pour_point_c: -60.0,
    volatile_frac: 0.80,
    dispersibility: 0.9,
};

impl OilProperties {
    pub const fn for_kind(kind: OilKind) -> &'static OilProperties {
        match kind {
            OilKind::Crude => &CRUDE,
            OilKind::Fuel => &FUEL,
            OilKind::Diesel => &DIESEL,
            OilKind::Gasoline => &GASOLINE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_values_match_spec() {
        assert_eq!(OilProperties::for_kind(OilKind::Crude).density_kg_m3, 860.0);
        assert_eq!(OilProperties::for_kind(OilKind::Fuel).viscosity_mpa_s, 180.0);
        assert_eq!(OilProperties::for_kind(OilKind::Diesel).volatile_frac, 0.45);
        assert_eq!(OilProperties::for_kind(OilKind::Gasoline).dispersibility, 0.9);
    }
}
