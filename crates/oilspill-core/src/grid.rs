//! Spatio-temporal interpolated scalar fields. Spec §3.2, §4.A, §6.1.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Wire format for a grid resource, per spec §6.1. The variable map is
/// deliberately open — `wind` happens to carry `u10, v10`, `current` carries
/// `uo, vo`, `temperature` carries `thetao`, `landmask` carries `lsm` — but
/// nothing in this type or in [`FieldGrid`] bakes those names in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDocument {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    #[serde(default)]
    pub time_hours: Option<Vec<f64>>,
    #[serde(default)]
    pub shape: Vec<usize>,
    pub variables: HashMap<String, Vec<f64>>,
}

/// A loaded, validated grid. Immutable once built.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    lat: Vec<f64>,
    lon: Vec<f64>,
    time_hours: Option<Vec<f64>>,
    variables: HashMap<String, Vec<f64>>,
}

fn is_strictly_ascending(axis: &[f64]) -> bool {
    axis.windows(2).all(|w| w[1] > w[0])
}

impl FieldGrid {
    /// Validates and builds a grid from its wire document, per spec §7
    /// "Malformed grid". `is_land_mask` controls the NaN-fill contract of
    /// §3.2: missing values become `0.0` everywhere except a land mask,
    /// where they become `1.0` ("land").
    pub fn from_document(doc: &GridDocument, is_land_mask: bool) -> Result<FieldGrid, GridError> {
        if !is_strictly_ascending(&doc.lat) || !is_strictly_ascending(&doc.lon) {
            return Err(GridError::NonAscendingAxis);
        }
        if let Some(ref t) = doc.time_hours {
            if !is_strictly_ascending(t) {
                return Err(GridError::NonAscendingAxis);
            }
        }

        let n_lat = doc.lat.len();
        let n_lon = doc.lon.len();
        let n_t = doc.time_hours.as_ref().map(|t| t.len());
        let expected_len = n_t.unwrap_or(1) * n_lat * n_lon;

        let mut variables = HashMap::with_capacity(doc.variables.len());
        for (name, values) in &doc.variables {
            if values.len() != expected_len {
                return Err(GridError::LengthMismatch {
                    expected: expected_len,
                    actual: values.len(),
                });
            }
            let fill = if is_land_mask { 1.0 } else { 0.0 };
            let mut cleaned = Vec::with_capacity(values.len());
            for &v in values {
                if v.is_nan() {
                    cleaned.push(fill);
                } else if !v.is_finite() {
                    return Err(GridError::NonFiniteValue);
                } else {
                    cleaned.push(v);
                }
            }
            variables.insert(name.clone(), cleaned);
        }

        Ok(FieldGrid {
            lat: doc.lat.clone(),
            lon: doc.lon.clone(),
            time_hours: doc.time_hours.clone(),
            variables,
        })
    }

    fn lat_min(&self) -> f64 {
        self.lat[0]
    }
    fn lat_max(&self) -> f64 {
        self.lat[self.lat.len() - 1]
    }
    fn lon_min(&self) -> f64 {
        self.lon[0]
    }
    fn lon_max(&self) -> f64 {
        self.lon[self.lon.len() - 1]
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min() && lat <= self.lat_max() && lon >= self.lon_min() && lon <= self.lon_max()
    }

    /// Bilinear (and linear-in-time) sample. Never errors: an absent
    /// variable yields 0, out-of-axis inputs clamp to the domain edge.
    pub fn sample(&self, var: &str, lat: f64, lon: f64, time_hours: f64) -> f64 {
        let Some(values) = self.variables.get(var) else {
            return 0.0;
        };

        let n_lat = self.lat.len();
        let n_lon = self.lon.len();
        let d_lat = (self.lat_max() - self.lat_min()) / (n_lat - 1) as f64;
        let d_lon = (self.lon_max() - self.lon_min()) / (n_lon - 1) as f64;

        let fi = ((lat - self.lat_min()) / d_lat).clamp(0.0, (n_lat - 1) as f64);
        let fj = ((lon - self.lon_min()) / d_lon).clamp(0.0, (n_lon - 1) as f64);

        let i0 = (fi.floor() as usize).min(n_lat.saturating_sub(2));
        let i1 = i0 + 1;
        let j0 = (fj.floor() as usize).min(n_lon.saturating_sub(2));
        let j1 = j0 + 1;
        let di = fi - i0 as f64;
        let dj = fj - j0 as f64;

        match &self.time_hours {
            None => bilinear(values, n_lon, i0, i1, j0, j1, di, dj),
            Some(times) => {
                let n_t = times.len();
                let (t0, dt_frac) = locate_time(times, time_hours);
                let t1 = (t0 + 1).min(n_t - 1);
                let plane_len = n_lat * n_lon;
                let v0 = bilinear(&values[t0 * plane_len..(t0 + 1) * plane_len], n_lon, i0, i1, j0, j1, di, dj);
                if t1 == t0 {
                    return v0;
                }
                let v1 = bilinear(&values[t1 * plane_len..(t1 + 1) * plane_len], n_lon, i0, i1, j0, j1, di, dj);
                (1.0 - dt_frac) * v0 + dt_frac * v1
            }
        }
    }
}

fn bilinear(plane: &[f64], n_lon: usize, i0: usize, i1: usize, j0: usize, j1: usize, di: f64, dj: f64) -> f64 {
    let v00 = plane[i0 * n_lon + j0];
    let v01 = plane[i0 * n_lon + j1];
    let v10 = plane[i1 * n_lon + j0];
    let v11 = plane[i1 * n_lon + j1];
    (1.0 - di) * (1.0 - dj) * v00 + (1.0 - di) * dj * v01 + di * (1.0 - dj) * v10 + di * dj * v11
}

/// Locates `t0` such that `time_hours` falls in `[times[t0], times[t0+1]]`,
/// clamping to the endpoints when outside. Returns `(t0, dt_frac)` where
/// `dt_frac` is 0 when clamped. Linear scan per spec §4.A.6 (nT is small).
fn locate_time(times: &[f64], time_hours: f64) -> (usize, f64) {
    let n_t = times.len();
    if n_t == 1 || time_hours <= times[0] {
        return (0, 0.0);
    }
    if time_hours >= times[n_t - 1] {
        return (n_t - 2, 1.0);
    }
    for t0 in 0..n_t - 1 {
        if time_hours >= times[t0] && time_hours <= times[t0 + 1] {
            let span = times[t0 + 1] - times[t0];
            let frac = if span > 0.0 { (time_hours - times[t0]) / span } else { 0.0 };
            return (t0, frac);
        }
    }
    (n_t - 2, 1.0)
}

/// The four named grids spec §6.1 describes. Absence of any one is not an
/// error — the engine falls back to scalar fields for that variable set.
#[derive(Debug, Clone, Default)]
pub struct GridSet {
    pub wind: Option<FieldGrid>,
    pub current: Option<FieldGrid>,
    pub temperature: Option<FieldGrid>,
    pub landmask: Option<FieldGrid>,
}

impl GridSet {
    pub fn any_present(&self) -> bool {
        self.wind.is_some() || self.current.is_some() || self.temperature.is_some() || self.landmask.is_some()
    }

    /// Parses an optional grid-document JSON string into a validated
    /// `FieldGrid` slot. A missing document (`None`) or one that fails
    /// validation leaves the slot empty — per spec §7 "Malformed grid", this
    /// is never propagated as a hard error, only logged and skipped. The
    /// caller supplies `is_land_mask` per §3.2's NaN-fill contract.
    fn load_slot(json: Option<&str>, is_land_mask: bool) -> Option<FieldGrid> {
        let json = json?;
        let doc: GridDocument = match serde_json::from_str(json) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(%err, "grid document is not valid JSON, skipping");
                return None;
            }
        };
        match FieldGrid::from_document(&doc, is_land_mask) {
            Ok(grid) => Some(grid),
            Err(err) => {
                tracing::warn!(%err, "grid document rejected, falling back to scalar fields");
                None
            }
        }
    }

    /// Assembles a `GridSet` from the four named JSON documents of spec
    /// §6.1. Any of `wind`, `current`, `temperature`, `landmask` may be
    /// `None` or malformed; absence is scalar-fallback, not an error.
    pub fn from_json_documents(wind: Option<&str>, current: Option<&str>, temperature: Option<&str>, landmask: Option<&str>) -> GridSet {
        GridSet {
            wind: Self::load_slot(wind, false),
            current: Self::load_slot(current, false),
            temperature: Self::load_slot(temperature, false),
            landmask: Self::load_slot(landmask, true),
        }
    }
}
