//! TOML-based input snapshot and preset definitions.
//!
//! All range validation and clamping happens here, at the boundary; the
//! engine assumes sanitized inputs and never validates ranges itself.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::bills::Bill;
use crate::production::{SeasonalFactorTable, SystemConfig};
use crate::sim::types::RoiParams;
use crate::sizing::{BatteryConfig, MeteringRegime};
use crate::tariff::{TariffConfig, TariffTier};

/// Top-level input snapshot parsed from TOML.
///
/// All sections have defaults matching the baseline preset. Load from
/// TOML with [`InputSnapshot::from_toml_file`] or use
/// [`InputSnapshot::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputSnapshot {
    /// City keying the seasonal factor table.
    pub city: String,
    /// Active utility tariff regime.
    pub regime: MeteringRegime,
    /// Historical bills, up to 12; missing months are extrapolated.
    pub bills: Vec<Bill>,
    /// Utility tariff.
    pub tariff: TariffConfig,
    /// PV system parameters.
    pub system: SystemConfig,
    /// Battery parameters.
    pub battery: BatteryConfig,
    /// Degradation/escalation/maintenance parameters.
    pub roi: RoiParams,
    /// Installed system price (currency units).
    pub system_cost_aed: f64,
    /// Share of consumption during daylight hours (0.0-1.0).
    pub daytime_consumption_fraction: f64,
    /// Grid CO2 intensity (kg/kWh).
    pub emission_factor_kg_per_kwh: f64,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"tariff.tiers"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

/// DEWA-style residential slab tariff used by the baseline preset.
fn slab_tariff() -> TariffConfig {
    TariffConfig {
        tiers: vec![
            TariffTier {
                from_kwh: 1,
                to_kwh: Some(2000),
                rate_per_kwh: 0.23,
            },
            TariffTier {
                from_kwh: 2001,
                to_kwh: Some(4000),
                rate_per_kwh: 0.28,
            },
            TariffTier {
                from_kwh: 4001,
                to_kwh: Some(6000),
                rate_per_kwh: 0.32,
            },
            TariffTier {
                from_kwh: 6001,
                to_kwh: None,
                rate_per_kwh: 0.38,
            },
        ],
        fuel_surcharge_per_kwh: 0.06,
        fixed_monthly_charge: 10.0,
    }
}

impl InputSnapshot {
    /// Baseline preset: Dubai net-metering quote with the slab tariff and
    /// a flat 1,500 kWh/month consumption history, no battery.
    pub fn baseline() -> Self {
        Self {
            city: "Dubai".to_string(),
            regime: MeteringRegime::NetMetering,
            bills: (1..=12)
                .map(|month| Bill {
                    month,
                    consumption_kwh: 1500.0,
                    is_estimated: false,
                })
                .collect(),
            tariff: slab_tariff(),
            system: SystemConfig::default(),
            battery: BatteryConfig::default(),
            roi: RoiParams::default(),
            system_cost_aed: 36_000.0,
            daytime_consumption_fraction: 0.6,
            emission_factor_kg_per_kwh: crate::impact::DEFAULT_EMISSION_FACTOR_KG_PER_KWH,
        }
    }

    /// Battery-backup preset: self-consumption regime with a night-backup
    /// battery, for utilities without a net-metering program.
    pub fn battery_backup() -> Self {
        Self {
            regime: MeteringRegime::SelfConsumption,
            battery: BatteryConfig {
                enabled: true,
                ..BatteryConfig::default()
            },
            system_cost_aed: 52_000.0,
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "battery_backup"];

    /// Loads a snapshot from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "battery_backup" => Ok(Self::battery_backup()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a snapshot from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "snapshot".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a snapshot from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. A bad tariff
    /// shape is reported here so the caller can repair it (reset to a
    /// preset) instead of running the engine on it.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.tariff.validate() {
            errors.push(ConfigError {
                field: "tariff.tiers".into(),
                message: e.to_string(),
            });
        }

        if self.bills.len() > 12 {
            errors.push(ConfigError {
                field: "bills".into(),
                message: format!("at most 12 bills, got {}", self.bills.len()),
            });
        }
        let mut seen = [false; 12];
        for (i, bill) in self.bills.iter().enumerate() {
            if !(1..=12).contains(&bill.month) {
                errors.push(ConfigError {
                    field: format!("bills[{i}].month"),
                    message: "must be in 1..=12".into(),
                });
            } else if std::mem::replace(&mut seen[(bill.month - 1) as usize], true) {
                errors.push(ConfigError {
                    field: format!("bills[{i}].month"),
                    message: format!("month {} appears more than once", bill.month),
                });
            }
            if bill.consumption_kwh < 0.0 {
                errors.push(ConfigError {
                    field: format!("bills[{i}].consumption_kwh"),
                    message: "must be >= 0".into(),
                });
            }
        }

        if !SeasonalFactorTable::builtin().contains(&self.city) {
            errors.push(ConfigError {
                field: "city".into(),
                message: format!(
                    "\"{}\" not in the seasonal table; flat factors will be used",
                    self.city
                ),
            });
        }

        let sys = &self.system;
        if sys.peak_sun_hours <= 0.0 {
            errors.push(ConfigError {
                field: "system.peak_sun_hours".into(),
                message: "must be > 0".into(),
            });
        }
        if sys.panel_wattage_w <= 0.0 {
            errors.push(ConfigError {
                field: "system.panel_wattage_w".into(),
                message: "must be > 0".into(),
            });
        }
        if sys.available_area_m2 < 0.0 {
            errors.push(ConfigError {
                field: "system.available_area_m2".into(),
                message: "must be >= 0".into(),
            });
        }

        if self.system_cost_aed < 0.0 {
            errors.push(ConfigError {
                field: "system_cost_aed".into(),
                message: "must be >= 0".into(),
            });
        }

        errors
    }

    /// Returns a copy with every out-of-range parameter clamped into its
    /// valid domain. Applied once at the boundary; the engine itself
    /// never checks ranges.
    pub fn sanitized(&self) -> Self {
        let mut snapshot = self.clone();

        let sys = &mut snapshot.system;
        sys.component_efficiency = sys.component_efficiency.clamp(0.0, 1.0);
        sys.environmental_loss_factor = sys.environmental_loss_factor.clamp(0.0, 1.0);
        sys.inverter_sizing_ratio = sys.inverter_sizing_ratio.max(0.0);
        sys.peak_sun_hours = sys.peak_sun_hours.max(0.0);
        sys.panel_wattage_w = sys.panel_wattage_w.max(0.0);
        sys.available_area_m2 = sys.available_area_m2.max(0.0);

        let bat = &mut snapshot.battery;
        bat.usable_depth_of_discharge = bat.usable_depth_of_discharge.clamp(0.0, 1.0);
        bat.round_trip_efficiency = bat.round_trip_efficiency.clamp(0.0, 1.0);

        let roi = &mut snapshot.roi;
        roi.first_year_degradation = roi.first_year_degradation.clamp(0.0, 1.0);
        roi.annual_degradation_rate = roi.annual_degradation_rate.clamp(0.0, 1.0);
        roi.annual_escalation_rate = roi.annual_escalation_rate.max(0.0);
        roi.annual_maintenance_aed = roi.annual_maintenance_aed.max(0.0);

        snapshot.daytime_consumption_fraction =
            snapshot.daytime_consumption_fraction.clamp(0.0, 1.0);
        snapshot.emission_factor_kg_per_kwh = snapshot.emission_factor_kg_per_kwh.max(0.0);
        snapshot.system_cost_aed = snapshot.system_cost_aed.max(0.0);

        for bill in &mut snapshot.bills {
            bill.consumption_kwh = bill.consumption_kwh.max(0.0);
        }

        snapshot
    }
}
