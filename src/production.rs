//! Seasonal PV production model: city factor tables, loss chain, and
//! inverter clipping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Non-leap calendar used for all monthly energy integration.
pub const DAYS_IN_MONTH: [f64; 12] = [
    31.0, 28.0, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0,
];

/// Production gain applied when bifacial panels are enabled.
pub const BIFACIAL_BOOST: f64 = 1.08;

/// Racking footprint of a mounted panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelOrientation {
    Portrait,
    Landscape,
}

impl PanelOrientation {
    /// Roof area consumed per panel, including inter-row spacing.
    pub fn area_per_panel_m2(self) -> f64 {
        match self {
            Self::Portrait => 2.6,
            Self::Landscape => 2.9,
        }
    }
}

/// PV system parameters used for both sizing and production modelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Equivalent full-intensity sun hours per day.
    pub peak_sun_hours: f64,
    /// Nameplate wattage of one panel (W).
    pub panel_wattage_w: f64,
    /// Combined module/wiring/inverter efficiency (0.0-1.0).
    pub component_efficiency: f64,
    /// Soiling, shading, and temperature loss factor (0.0-1.0).
    pub environmental_loss_factor: f64,
    /// Whether panels are bifacial (applies [`BIFACIAL_BOOST`]).
    pub bifacial_enabled: bool,
    /// Inverter AC capacity as a fraction of array DC size.
    pub inverter_sizing_ratio: f64,
    /// Panel mounting orientation (affects roof area per panel).
    pub panel_orientation: PanelOrientation,
    /// Roof area available for the array (m²).
    pub available_area_m2: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            peak_sun_hours: 5.5,
            panel_wattage_w: 550.0,
            component_efficiency: 0.96,
            environmental_loss_factor: 0.85,
            bifacial_enabled: false,
            inverter_sizing_ratio: 0.9,
            panel_orientation: PanelOrientation::Portrait,
            available_area_m2: 100.0,
        }
    }
}

impl SystemConfig {
    /// Combined multiplicative efficiency: component × environmental ×
    /// bifacial boost when enabled. Shared by sizing and production so the
    /// two stay consistent.
    pub fn total_efficiency(&self) -> f64 {
        let bifacial = if self.bifacial_enabled {
            BIFACIAL_BOOST
        } else {
            1.0
        };
        self.component_efficiency * self.environmental_loss_factor * bifacial
    }
}

/// Per-city monthly production multipliers. Immutable reference data; the
/// yearly average is normalized to 1.0 before the factors are used as
/// production weights.
#[derive(Debug, Clone)]
pub struct SeasonalFactorTable {
    cities: BTreeMap<String, [f64; 12]>,
}

impl SeasonalFactorTable {
    /// Built-in table covering the Gulf markets the calculator serves.
    pub fn builtin() -> Self {
        let mut cities = BTreeMap::new();
        cities.insert(
            "Dubai".to_string(),
            [
                0.85, 0.90, 1.00, 1.08, 1.15, 1.18, 1.15, 1.12, 1.05, 0.98, 0.88, 0.82,
            ],
        );
        cities.insert(
            "Abu Dhabi".to_string(),
            [
                0.86, 0.91, 1.01, 1.09, 1.14, 1.17, 1.14, 1.11, 1.04, 0.97, 0.88, 0.83,
            ],
        );
        cities.insert(
            "Sharjah".to_string(),
            [
                0.85, 0.90, 1.00, 1.07, 1.14, 1.17, 1.15, 1.12, 1.05, 0.98, 0.89, 0.83,
            ],
        );
        cities.insert(
            "Riyadh".to_string(),
            [
                0.82, 0.88, 0.98, 1.07, 1.16, 1.21, 1.19, 1.14, 1.06, 0.97, 0.86, 0.80,
            ],
        );
        cities.insert(
            "Doha".to_string(),
            [
                0.84, 0.89, 0.99, 1.08, 1.15, 1.19, 1.16, 1.12, 1.05, 0.98, 0.87, 0.82,
            ],
        );
        Self { cities }
    }

    /// Builds a table from caller-supplied factors.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, [f64; 12])>) -> Self {
        Self {
            cities: entries.into_iter().collect(),
        }
    }

    /// Whether the table has an entry for `city`.
    pub fn contains(&self, city: &str) -> bool {
        self.cities.contains_key(city)
    }

    /// City names in the table, sorted.
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.cities.keys().map(String::as_str)
    }

    /// Raw (un-normalized) factors for `city`.
    pub fn factors(&self, city: &str) -> Option<&[f64; 12]> {
        self.cities.get(city)
    }

    /// Factors for `city` rescaled so their yearly average is exactly 1.0.
    ///
    /// Returns flat factors (all 1.0) for a city not in the table, so the
    /// pipeline degrades to an unweighted model instead of failing.
    pub fn normalized(&self, city: &str) -> [f64; 12] {
        match self.cities.get(city) {
            Some(raw) => normalize_factors(raw),
            None => [1.0; 12],
        }
    }
}

/// Rescales 12 factors so their mean is 1.0. Flat factors are returned
/// unchanged when the mean is not positive.
pub fn normalize_factors(raw: &[f64; 12]) -> [f64; 12] {
    let mean = raw.iter().sum::<f64>() / 12.0;
    if mean <= 0.0 {
        return [1.0; 12];
    }
    let mut out = [0.0; 12];
    for (o, r) in out.iter_mut().zip(raw.iter()) {
        *o = r / mean;
    }
    out
}

/// Monthly AC production of a `system_size_kwp` array.
///
/// Per month: `size × PSH × days × normalized factor × total efficiency`,
/// clipped to `inverter_capacity_kw × PSH × days`. Linear in system size
/// wherever clipping is inactive.
pub fn monthly_production(
    system_size_kwp: f64,
    inverter_capacity_kw: f64,
    normalized_factors: &[f64; 12],
    config: &SystemConfig,
) -> [f64; 12] {
    let efficiency = config.total_efficiency();
    let mut out = [0.0; 12];
    for (m, slot) in out.iter_mut().enumerate() {
        let sun_hours = config.peak_sun_hours * DAYS_IN_MONTH[m];
        let unclipped = system_size_kwp * sun_hours * normalized_factors[m] * efficiency;
        let inverter_ceiling = inverter_capacity_kw * sun_hours;
        *slot = unclipped.min(inverter_ceiling).max(0.0);
    }
    out
}
