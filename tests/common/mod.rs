//! Shared test fixtures for integration tests.

use solar_roi_sim::bills::Bill;
use solar_roi_sim::config::InputSnapshot;
use solar_roi_sim::sizing::{BatteryConfig, BatteryMode, MeteringRegime};
use solar_roi_sim::tariff::{TariffConfig, TariffTier};

/// Single-tier tariff with no surcharge and no fixed charge.
///
/// Every saved kWh is worth exactly `rate`, which makes expected savings
/// easy to compute by hand.
pub fn flat_tariff(rate: f64) -> TariffConfig {
    TariffConfig {
        tiers: vec![TariffTier {
            from_kwh: 1,
            to_kwh: None,
            rate_per_kwh: rate,
        }],
        fuel_surcharge_per_kwh: 0.0,
        fixed_monthly_charge: 0.0,
    }
}

/// Baseline snapshot with a flat tariff and zeroed degradation,
/// escalation, and maintenance, so outcomes are hand-checkable.
pub fn flat_snapshot(rate: f64) -> InputSnapshot {
    let mut snapshot = InputSnapshot::baseline();
    snapshot.tariff = flat_tariff(rate);
    snapshot.roi.first_year_degradation = 0.0;
    snapshot.roi.annual_degradation_rate = 0.0;
    snapshot.roi.annual_escalation_rate = 0.0;
    snapshot.roi.annual_maintenance_aed = 0.0;
    snapshot
}

/// Flat snapshot switched to the self-consumption regime.
pub fn self_consumption_snapshot(rate: f64) -> InputSnapshot {
    let mut snapshot = flat_snapshot(rate);
    snapshot.regime = MeteringRegime::SelfConsumption;
    snapshot
}

/// Battery configuration with ideal (lossless, full-depth) parameters.
pub fn ideal_battery(mode: BatteryMode) -> BatteryConfig {
    BatteryConfig {
        enabled: true,
        mode,
        usable_depth_of_discharge: 1.0,
        round_trip_efficiency: 1.0,
    }
}

/// Twelve bills at a flat monthly consumption.
pub fn flat_bills(kwh_per_month: f64) -> Vec<Bill> {
    (1..=12)
        .map(|month| Bill {
            month,
            consumption_kwh: kwh_per_month,
            is_estimated: false,
        })
        .collect()
}
