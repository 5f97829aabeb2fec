//! Target-consumption sizing policy: panel count, inverter, battery, and
//! roof-area advisory.

use serde::{Deserialize, Serialize};

use crate::production::{DAYS_IN_MONTH, SystemConfig, monthly_production};

/// Active utility tariff regime, which drives the sizing target and the
/// monthly offset model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeteringRegime {
    /// Exports are banked as kWh credits (regime A).
    NetMetering,
    /// Exports are lost; only self-consumed energy has value (regime B).
    SelfConsumption,
}

/// Battery operating strategy under the self-consumption regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryMode {
    /// Battery shifts day production into the night; the array is sized
    /// for the full consumption.
    NightBackup,
    /// The array stays daytime-sized; the battery only absorbs the
    /// daytime excess.
    StoreUnused,
}

/// Battery storage parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Whether a battery is part of the quote.
    pub enabled: bool,
    /// Operating strategy.
    pub mode: BatteryMode,
    /// Usable depth of discharge (0.0-1.0).
    pub usable_depth_of_discharge: f64,
    /// Round-trip efficiency (0.0-1.0), applied once at charge time.
    pub round_trip_efficiency: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: BatteryMode::NightBackup,
            usable_depth_of_discharge: 0.9,
            round_trip_efficiency: 0.95,
        }
    }
}

/// Derived sizing outcome. Recomputed whole whenever an upstream input
/// changes; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingResult {
    /// Number of panels, at least 1.
    pub panel_count: u32,
    /// Installed DC size: `panel_count × wattage / 1000` (kWp).
    pub actual_system_size_kwp: f64,
    /// Inverter AC capacity (kW).
    pub inverter_capacity_kw: f64,
    /// Roof area the array needs (m²).
    pub area_required_m2: f64,
    /// Expected AC production per calendar month (kWh), year 1.
    pub monthly_production_kwh: [f64; 12],
    /// Sum of the monthly series (kWh).
    pub annual_production_kwh: f64,
    /// Recommended battery capacity (kWh); 0 when no battery.
    pub battery_capacity_kwh: f64,
    /// Advisory: the array does not fit the available roof area.
    /// Sizing still completes; the quote surfaces the warning.
    pub area_exceeds_available: bool,
}

/// Sizes a system for the given consumption profile and policy.
///
/// The target annual production depends on the regime and battery mode:
/// net metering and night-backup batteries size to the full consumption,
/// while a battery-less (or store-unused) self-consumption system is
/// sized to the daytime fraction only.
pub fn size_system(
    monthly_consumption_kwh: &[f64; 12],
    daytime_fraction: f64,
    regime: MeteringRegime,
    battery: &BatteryConfig,
    system: &SystemConfig,
    normalized_factors: &[f64; 12],
) -> SizingResult {
    let annual_consumption: f64 = monthly_consumption_kwh.iter().sum();

    let target_annual_kwh = match (regime, battery.enabled, battery.mode) {
        (MeteringRegime::NetMetering, _, _) => annual_consumption,
        (MeteringRegime::SelfConsumption, false, _) => daytime_fraction * annual_consumption,
        (MeteringRegime::SelfConsumption, true, BatteryMode::NightBackup) => annual_consumption,
        (MeteringRegime::SelfConsumption, true, BatteryMode::StoreUnused) => {
            daytime_fraction * annual_consumption
        }
    };

    let denominator = system.peak_sun_hours * 365.0 * system.total_efficiency();
    let ideal_size_kwp = if denominator > 0.0 {
        target_annual_kwh / denominator
    } else {
        0.0
    };

    let panel_count = if system.panel_wattage_w > 0.0 {
        ((ideal_size_kwp * 1000.0 / system.panel_wattage_w).ceil() as u32).max(1)
    } else {
        1
    };
    let actual_system_size_kwp = f64::from(panel_count) * system.panel_wattage_w / 1000.0;
    let inverter_capacity_kw = actual_system_size_kwp * system.inverter_sizing_ratio;
    let area_required_m2 =
        f64::from(panel_count) * system.panel_orientation.area_per_panel_m2();

    let monthly_production_kwh = monthly_production(
        actual_system_size_kwp,
        inverter_capacity_kw,
        normalized_factors,
        system,
    );
    let annual_production_kwh: f64 = monthly_production_kwh.iter().sum();

    let battery_capacity_kwh = battery_capacity_kwh(
        battery,
        monthly_consumption_kwh,
        &monthly_production_kwh,
        daytime_fraction,
        annual_consumption,
    );

    SizingResult {
        panel_count,
        actual_system_size_kwp,
        inverter_capacity_kw,
        area_required_m2,
        monthly_production_kwh,
        annual_production_kwh,
        battery_capacity_kwh,
        area_exceeds_available: area_required_m2 > system.available_area_m2,
    }
}

/// Battery capacity for the configured mode.
///
/// Night backup sizes to the average nightly load; store-unused sizes to
/// the worst month's daytime excess (daily average), not the yearly mean.
/// Both divide by `usable DoD × round-trip efficiency` to get nameplate
/// capacity from deliverable energy.
fn battery_capacity_kwh(
    battery: &BatteryConfig,
    monthly_consumption_kwh: &[f64; 12],
    monthly_production_kwh: &[f64; 12],
    daytime_fraction: f64,
    annual_consumption: f64,
) -> f64 {
    if !battery.enabled {
        return 0.0;
    }
    let denominator = battery.usable_depth_of_discharge * battery.round_trip_efficiency;
    if denominator <= 0.0 {
        return 0.0;
    }
    match battery.mode {
        BatteryMode::NightBackup => {
            let nightly_daily_kwh = (1.0 - daytime_fraction) * annual_consumption / 365.0;
            nightly_daily_kwh / denominator
        }
        BatteryMode::StoreUnused => {
            let mut worst_daily_excess = 0.0_f64;
            for m in 0..12 {
                let daytime_load = daytime_fraction * monthly_consumption_kwh[m];
                let excess = (monthly_production_kwh[m] - daytime_load).max(0.0);
                worst_daily_excess = worst_daily_excess.max(excess / DAYS_IN_MONTH[m]);
            }
            worst_daily_excess / denominator
        }
    }
}
